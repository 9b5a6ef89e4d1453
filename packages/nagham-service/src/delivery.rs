use std::path::Path;

use crate::{BoxFuture, Candidate, Error, NaghamService, ResolvedTrack, Result, UserId};
use nagham_domain::intent;

const USAGE_HINT: &str = "🤖 اكتب اسم أغنية تبدأ بـ شغل ...";
const FAILURE_MESSAGE: &str = "❌ حصل خطأ أثناء تحميل الأغنية.";
const COOKIES_HINT: &str = "يمكن لازم Cookies.";

/// Where a played track ends up: a chat, an HTTP response, a test recorder.
pub trait TrackSink
where
	Self: Send + Sync,
{
	fn deliver_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<()>>;

	/// Called while the scratch directory of a downloaded file is still alive. The sink must
	/// finish reading the file before the returned future resolves.
	fn deliver_audio<'a>(&'a self, audio: AudioDelivery<'a>) -> BoxFuture<'a, Result<()>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioDelivery<'a> {
	Preview { url: &'a str, title: &'a str, artist: &'a str },
	File { path: &'a Path, file_name: &'a str, title: &'a str, artist: &'a str },
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlayOutcome {
	NotAPlayRequest,
	MissingQuery,
	NoResults,
	Played(Candidate),
}

impl ResolvedTrack {
	pub fn as_delivery(&self) -> AudioDelivery<'_> {
		match self {
			Self::Preview(preview) => AudioDelivery::Preview {
				url: &preview.url,
				title: &preview.title,
				artist: &preview.artist,
			},
			Self::Downloaded(track) => AudioDelivery::File {
				path: track.path(),
				file_name: track.file_name(),
				title: track.title(),
				artist: track.artist(),
			},
		}
	}
}

impl NaghamService {
	/// Handles one chat message end to end: trigger detection, resolution, retrieval of the top
	/// candidate, delivery, and cleanup of any downloaded file.
	pub async fn play(&self, text: &str, user_id: UserId, sink: &dyn TrackSink) -> Result<PlayOutcome> {
		let Some(request) = intent::parse_play_request(text) else {
			sink.deliver_text(USAGE_HINT).await?;

			return Ok(PlayOutcome::NotAPlayRequest);
		};

		if request.query.trim().is_empty() {
			sink.deliver_text(USAGE_HINT).await?;

			return Ok(PlayOutcome::MissingQuery);
		}

		let candidates = match self.resolve(&request.query, user_id).await {
			Ok(candidates) => candidates,
			Err(err) => {
				report(sink, &err).await;

				return Err(err);
			},
		};
		let Some(top) = candidates.into_iter().next() else {
			sink.deliver_text(&format!("🔍 ملقيتش نتائج لـ: {}", request.query)).await?;

			return Ok(PlayOutcome::NoResults);
		};

		sink.deliver_text(&format!("🎵 بحمّل: {}", top.display_title)).await?;

		let resolved = match self.retrieve(&top).await {
			Ok(resolved) => resolved,
			Err(err) => {
				report(sink, &err).await;

				return Err(err);
			},
		};
		let delivered = sink.deliver_audio(resolved.as_delivery()).await;

		if let ResolvedTrack::Downloaded(track) = resolved {
			let dir = track.scratch_dir().to_path_buf();

			if let Err(err) = track.close() {
				tracing::warn!(path = %dir.display(), error = %err, "Scratch directory cleanup failed.");
			}
		}

		delivered?;

		tracing::info!(user_id, provider = top.provider.as_str(), title = %top.display_title, "Track played.");

		Ok(PlayOutcome::Played(top))
	}
}

async fn report(sink: &dyn TrackSink, err: &Error) {
	let message = match err {
		Error::DownloadFailed { .. } => format!("{FAILURE_MESSAGE} {COOKIES_HINT}"),
		_ => FAILURE_MESSAGE.to_string(),
	};

	if let Err(send_err) = sink.deliver_text(&message).await {
		tracing::warn!(error = %send_err, "Failed to report a play error.");
	}
}
