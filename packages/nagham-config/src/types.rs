use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub providers: Providers,
	#[serde(default)]
	pub resolve: Resolve,
	#[serde(default)]
	pub download: Download,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Providers {
	pub video: Option<VideoProviderConfig>,
	pub catalog: Option<CatalogProviderConfig>,
}

/// Video-hosting search endpoint. The capability is disabled when the section is absent or the
/// key is blank.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoProviderConfig {
	#[serde(default = "default_video_api_base")]
	pub api_base: String,
	#[serde(default = "default_video_path")]
	pub path: String,
	pub api_key: String,
	/// Content category restricting results to music.
	#[serde(default = "default_category_id")]
	pub category_id: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProviderConfig {
	#[serde(default = "default_catalog_api_base")]
	pub api_base: String,
	#[serde(default = "default_search_path")]
	pub search_path: String,
	#[serde(default = "default_lookup_path")]
	pub lookup_path: String,
	#[serde(default = "default_entity")]
	pub entity: String,
	#[serde(default = "default_per_call_limit")]
	pub per_call_limit: u32,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
	#[default]
	Video,
	Catalog,
}
impl ProviderKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Video => "video",
			Self::Catalog => "catalog",
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Resolve {
	pub default_provider: ProviderKind,
	/// Fallback region order for the catalog provider. A user's preferred region is searched
	/// first and removed from this list.
	pub default_regions: Vec<String>,
	pub video_fetch_limit: u32,
	pub video_result_limit: u32,
	pub catalog_rank_limit: u32,
	pub catalog_result_limit: u32,
}
impl Default for Resolve {
	fn default() -> Self {
		Self {
			default_provider: ProviderKind::Video,
			default_regions: ["eg", "sa", "ae", "us", "gb"].map(str::to_string).to_vec(),
			video_fetch_limit: 12,
			video_result_limit: 5,
			catalog_rank_limit: 30,
			catalog_result_limit: 10,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Download {
	pub tool_path: String,
	pub audio_format: String,
	pub audio_quality: String,
	pub timeout_ms: u64,
	pub cookies_file: Option<PathBuf>,
	/// Parent directory for per-request scratch directories. Uses the system temp dir when unset.
	pub temp_root: Option<PathBuf>,
}
impl Default for Download {
	fn default() -> Self {
		Self {
			tool_path: "yt-dlp".to_string(),
			audio_format: "mp3".to_string(),
			audio_quality: "192K".to_string(),
			timeout_ms: 300_000,
			cookies_file: None,
			temp_root: None,
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_video_api_base() -> String {
	"https://www.googleapis.com".to_string()
}

fn default_video_path() -> String {
	"/youtube/v3/search".to_string()
}

fn default_category_id() -> String {
	"10".to_string()
}

fn default_catalog_api_base() -> String {
	"https://itunes.apple.com".to_string()
}

fn default_search_path() -> String {
	"/search".to_string()
}

fn default_lookup_path() -> String {
	"/lookup".to_string()
}

fn default_entity() -> String {
	"song".to_string()
}

fn default_per_call_limit() -> u32 {
	25
}

fn default_timeout_ms() -> u64 {
	15_000
}
