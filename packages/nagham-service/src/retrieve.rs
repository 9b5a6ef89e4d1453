use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{Candidate, Error, NaghamService, Result};
use nagham_config::ProviderKind;
use nagham_domain::filename;
use nagham_providers::{RawCandidate, TrackHandle, download, video};

const SCRATCH_PREFIX: &str = "nagham-";

/// Terminal artifact of one retrieval.
#[derive(Debug)]
pub enum ResolvedTrack {
	/// Provider-hosted preview; nothing is stored locally.
	Preview(PreviewTrack),
	/// Transcoded file inside a scratch directory owned by this value.
	Downloaded(DownloadedTrack),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewTrack {
	pub track_id: u64,
	pub url: String,
	pub title: String,
	pub artist: String,
	pub album: Option<String>,
}

/// A downloaded audio file. The scratch directory holding it is removed exactly once: by
/// [`DownloadedTrack::close`] or when the value is dropped.
#[derive(Debug)]
pub struct DownloadedTrack {
	dir: TempDir,
	path: PathBuf,
	file_name: String,
	title: String,
	artist: String,
}
impl DownloadedTrack {
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Filesystem-safe display name derived from the title.
	pub fn file_name(&self) -> &str {
		&self.file_name
	}

	pub fn title(&self) -> &str {
		&self.title
	}

	pub fn artist(&self) -> &str {
		&self.artist
	}

	pub fn scratch_dir(&self) -> &Path {
		self.dir.path()
	}

	pub fn close(self) -> std::io::Result<()> {
		self.dir.close()
	}
}

impl NaghamService {
	/// Produces a playable artifact for `candidate`: the catalog preview locator, or a freshly
	/// downloaded and transcoded file for video candidates.
	pub async fn retrieve(&self, candidate: &Candidate) -> Result<ResolvedTrack> {
		match (candidate.provider, &candidate.handle) {
			(ProviderKind::Catalog, TrackHandle::TrackId(track_id)) =>
				self.retrieve_preview(candidate, *track_id).await.map(ResolvedTrack::Preview),
			(ProviderKind::Video, TrackHandle::VideoUrl(url)) =>
				self.retrieve_download(candidate, url).await.map(ResolvedTrack::Downloaded),
			(provider, _) => Err(Error::InvalidRequest {
				message: format!("Candidate handle does not belong to the {} provider.", provider.as_str()),
			}),
		}
	}

	async fn retrieve_preview(&self, candidate: &Candidate, track_id: u64) -> Result<PreviewTrack> {
		let Some(cfg) = self.cfg.providers.catalog.as_ref() else {
			return Err(Error::Configuration {
				message: "Catalog provider is not configured.".to_string(),
			});
		};
		// The search response can omit the preview locator, so ask for the full record again.
		let lookup = crate::guarded(
			cfg.timeout_ms,
			self.providers.catalog.lookup(cfg, track_id, candidate.region.as_deref()),
		)
		.await;
		let fresh: Option<RawCandidate> = match lookup {
			Ok(Ok(record)) => record,
			Ok(Err(err)) => {
				tracing::warn!(provider = "catalog", track_id, error = %err, "Track lookup failed.");

				None
			},
			Err(reason) => {
				tracing::warn!(provider = "catalog", track_id, error = %reason, "Track lookup failed.");

				None
			},
		};
		let url = fresh
			.as_ref()
			.and_then(|record| record.preview_url.clone())
			.or_else(|| candidate.preview_url.clone())
			.ok_or(Error::NoPreviewAvailable { track_id })?;
		let title = fresh
			.as_ref()
			.map(|record| record.title.clone())
			.filter(|title| !title.is_empty())
			.unwrap_or_else(|| candidate.display_title.clone());
		let artist = fresh
			.as_ref()
			.map(|record| record.attribution.clone())
			.filter(|artist| !artist.is_empty())
			.unwrap_or_else(|| candidate.attribution.clone());
		let album = fresh.and_then(|record| record.album).or_else(|| candidate.album.clone());

		Ok(PreviewTrack { track_id, url, title, artist, album })
	}

	async fn retrieve_download(&self, candidate: &Candidate, url: &str) -> Result<DownloadedTrack> {
		let Some(video_id) = video::video_id(url) else {
			return Err(Error::InvalidRequest {
				message: "Video handle is not a canonical watch URL.".to_string(),
			});
		};
		let watch_url = video::watch_url(video_id);
		let url = watch_url.as_str();
		let cfg = &self.cfg.download;
		let dir = self.scratch_dir()?;
		let fetched = match self.providers.fetcher.fetch(cfg, url, dir.path()).await {
			Ok(fetched) => fetched,
			Err(err) => {
				let err = Error::from(err);

				tracing::warn!(url, error = %err, code = err.code(), "Audio retrieval failed.");
				release(dir);

				return Err(err);
			},
		};

		let Some(path) = download::file_within(dir.path(), &fetched.path).await else {
			release(dir);

			return Err(Error::TranscodeFailed {
				message: "Download tool reported a file outside its scratch directory.".to_string(),
			});
		};

		let title = fetched
			.title
			.filter(|title| !title.trim().is_empty())
			.unwrap_or_else(|| candidate.display_title.clone());
		let artist = fetched
			.artist
			.filter(|artist| !artist.trim().is_empty())
			.unwrap_or_else(|| candidate.attribution.clone());
		let extension = path
			.extension()
			.and_then(|ext| ext.to_str())
			.unwrap_or(cfg.audio_format.as_str())
			.to_string();
		let file_name = filename::safe_file_name(&title, &extension);

		tracing::info!(url, file_name, "Audio retrieved.");

		Ok(DownloadedTrack { dir, path, file_name, title, artist })
	}

	fn scratch_dir(&self) -> Result<TempDir> {
		let mut builder = tempfile::Builder::new();

		builder.prefix(SCRATCH_PREFIX);

		let dir = match self.cfg.download.temp_root.as_ref() {
			Some(root) => builder.tempdir_in(root)?,
			None => builder.tempdir()?,
		};

		Ok(dir)
	}
}

fn release(dir: TempDir) {
	let path = dir.path().to_path_buf();

	if let Err(err) = dir.close() {
		tracing::warn!(path = %path.display(), error = %err, "Scratch directory cleanup failed.");
	}
}
