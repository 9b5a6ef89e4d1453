pub mod dedup;
pub mod delivery;
pub mod preferences;
pub mod ranking;
pub mod regions;
pub mod resolve;
pub mod retrieve;

mod error;

pub use delivery::{AudioDelivery, PlayOutcome, TrackSink};
pub use error::{Error, Result};
pub use preferences::{PreferenceStore, UserId, UserPreference};
pub use regions::RegionalSearch;
pub use resolve::{Candidate, Query};
pub use retrieve::{DownloadedTrack, PreviewTrack, ResolvedTrack};

use std::{future::Future, path::Path, pin::Pin, sync::Arc, time::Duration as StdDuration};

use nagham_config::{CatalogProviderConfig, Config, Download, VideoProviderConfig};
use nagham_providers::{
	RawCandidate, catalog,
	catalog::SearchAttribute,
	download::{self, FetchedAudio},
	video,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait VideoSearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a VideoProviderConfig,
		query: &'a str,
		region: Option<&'a str>,
		limit: u32,
	) -> BoxFuture<'a, nagham_providers::Result<Vec<RawCandidate>>>;
}

pub trait CatalogProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a CatalogProviderConfig,
		term: &'a str,
		country: &'a str,
		attribute: SearchAttribute,
	) -> BoxFuture<'a, nagham_providers::Result<Vec<RawCandidate>>>;

	fn lookup<'a>(
		&'a self,
		cfg: &'a CatalogProviderConfig,
		track_id: u64,
		country: Option<&'a str>,
	) -> BoxFuture<'a, nagham_providers::Result<Option<RawCandidate>>>;
}

pub trait AudioFetcher
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		cfg: &'a Download,
		url: &'a str,
		out_dir: &'a Path,
	) -> BoxFuture<'a, nagham_providers::Result<FetchedAudio>>;

	fn probe<'a>(&'a self, cfg: &'a Download) -> BoxFuture<'a, nagham_providers::Result<String>>;
}

/// Result of one provider call after failure isolation. A failed call is an explicit
/// zero-result outcome, never an error for the caller.
#[derive(Debug)]
pub enum ProviderOutcome {
	Rows(Vec<RawCandidate>),
	Unavailable { reason: String },
}
impl ProviderOutcome {
	pub fn is_unavailable(&self) -> bool {
		matches!(self, Self::Unavailable { .. })
	}

	pub fn into_rows(self) -> Vec<RawCandidate> {
		match self {
			Self::Rows(rows) => rows,
			Self::Unavailable { .. } => Vec::new(),
		}
	}
}

#[derive(Clone)]
pub struct Providers {
	pub video: Arc<dyn VideoSearchProvider>,
	pub catalog: Arc<dyn CatalogProvider>,
	pub fetcher: Arc<dyn AudioFetcher>,
}
impl Providers {
	pub fn new(
		video: Arc<dyn VideoSearchProvider>,
		catalog: Arc<dyn CatalogProvider>,
		fetcher: Arc<dyn AudioFetcher>,
	) -> Self {
		Self { video, catalog, fetcher }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { video: provider.clone(), catalog: provider.clone(), fetcher: provider }
	}
}

pub struct NaghamService {
	pub cfg: Config,
	pub preferences: Arc<PreferenceStore>,
	pub providers: Providers,
}
impl NaghamService {
	pub fn new(cfg: Config, preferences: Arc<PreferenceStore>) -> Self {
		Self { cfg, preferences, providers: Providers::default() }
	}

	pub fn with_providers(
		cfg: Config,
		preferences: Arc<PreferenceStore>,
		providers: Providers,
	) -> Self {
		Self { cfg, preferences, providers }
	}

	/// Verifies the download tool at startup. A failure disables retrieval of downloaded audio
	/// but leaves search untouched.
	pub async fn check_download_tool(&self) -> Result<String> {
		let version = self.providers.fetcher.probe(&self.cfg.download).await?;

		tracing::info!(tool = %self.cfg.download.tool_path, %version, "Download tool available.");

		Ok(version)
	}
}

struct DefaultProviders;
impl VideoSearchProvider for DefaultProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a VideoProviderConfig,
		query: &'a str,
		region: Option<&'a str>,
		limit: u32,
	) -> BoxFuture<'a, nagham_providers::Result<Vec<RawCandidate>>> {
		Box::pin(video::search(cfg, query, region, limit))
	}
}
impl CatalogProvider for DefaultProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a CatalogProviderConfig,
		term: &'a str,
		country: &'a str,
		attribute: SearchAttribute,
	) -> BoxFuture<'a, nagham_providers::Result<Vec<RawCandidate>>> {
		Box::pin(catalog::search(cfg, term, country, attribute))
	}

	fn lookup<'a>(
		&'a self,
		cfg: &'a CatalogProviderConfig,
		track_id: u64,
		country: Option<&'a str>,
	) -> BoxFuture<'a, nagham_providers::Result<Option<RawCandidate>>> {
		Box::pin(catalog::lookup(cfg, track_id, country))
	}
}
impl AudioFetcher for DefaultProviders {
	fn fetch<'a>(
		&'a self,
		cfg: &'a Download,
		url: &'a str,
		out_dir: &'a Path,
	) -> BoxFuture<'a, nagham_providers::Result<FetchedAudio>> {
		Box::pin(download::fetch_audio(cfg, url, out_dir))
	}

	fn probe<'a>(&'a self, cfg: &'a Download) -> BoxFuture<'a, nagham_providers::Result<String>> {
		Box::pin(download::probe(cfg))
	}
}

/// Runs one external call under a hard deadline.
pub(crate) async fn guarded<F>(
	timeout_ms: u64,
	call: F,
) -> std::result::Result<F::Output, String>
where
	F: Future,
{
	tokio::time::timeout(StdDuration::from_millis(timeout_ms), call)
		.await
		.map_err(|_| format!("Timed out after {timeout_ms} ms."))
}

/// Folds a failed or timed-out search call into [`ProviderOutcome::Unavailable`].
pub(crate) async fn search_outcome<F>(timeout_ms: u64, call: F) -> ProviderOutcome
where
	F: Future<Output = nagham_providers::Result<Vec<RawCandidate>>>,
{
	match guarded(timeout_ms, call).await {
		Ok(Ok(rows)) => ProviderOutcome::Rows(rows),
		Ok(Err(err)) => ProviderOutcome::Unavailable { reason: err.to_string() },
		Err(reason) => ProviderOutcome::Unavailable { reason },
	}
}
