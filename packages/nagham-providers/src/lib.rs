pub mod catalog;
pub mod download;
pub mod video;

mod error;

pub use error::{Error, Result};

use std::time::Duration as StdDuration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use nagham_config::ProviderKind;

/// Provider-native way to reach a track again.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TrackHandle {
	/// Canonical watch URL on the video-hosting provider.
	VideoUrl(String),
	/// Numeric catalog track id.
	TrackId(u64),
}

/// One result row as returned by a provider, before scoring or deduplication.
#[derive(Clone, Debug, PartialEq)]
pub struct RawCandidate {
	pub provider: ProviderKind,
	pub title: String,
	/// Channel name for videos, artist name for catalog tracks.
	pub attribution: String,
	pub handle: TrackHandle,
	pub album: Option<String>,
	pub preview_url: Option<String>,
	/// Region the row was found in, when the search was region-scoped.
	pub region: Option<String>,
}

pub(crate) fn http_client(timeout_ms: u64) -> Result<Client> {
	Ok(Client::builder().timeout(StdDuration::from_millis(timeout_ms)).build()?)
}

pub(crate) fn json_str(value: &serde_json::Value, key: &str) -> Option<String> {
	value.get(key).and_then(|v| v.as_str()).map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}
