use std::{path::Path as FsPath, sync::Mutex};

use axum::{
	Json, Router,
	body::Body,
	extract::{Path, State},
	http::{HeaderValue, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use nagham_service::{
	AudioDelivery, BoxFuture, Candidate, Error as ServiceError, PlayOutcome, ResolvedTrack,
	TrackSink, UserId, UserPreference,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/resolve", post(resolve))
		.route("/v1/retrieve", post(retrieve))
		.route("/v1/play", post(play))
		.route(
			"/v1/preferences/{user_id}",
			get(get_preference).put(set_preference).delete(clear_preference),
		)
		.with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
	pub query: String,
	#[serde(default)]
	pub user_id: UserId,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
	pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct RetrieveRequest {
	pub candidate: Candidate,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
	pub kind: &'static str,
	pub track_id: u64,
	pub url: String,
	pub title: String,
	pub artist: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub album: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
	pub text: String,
	#[serde(default)]
	pub user_id: UserId,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
	pub outcome: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub track: Option<Candidate>,
	pub messages: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub audio: Option<PlayedAudio>,
}

/// What the play flow handed to the sink. File bytes are not inlined; use `/v1/retrieve`.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayedAudio {
	Preview { url: String, title: String, artist: String },
	File { file_name: String, title: String, artist: String, size_bytes: u64 },
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn resolve(
	State(state): State<AppState>,
	Json(payload): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
	let candidates = state.service.resolve(&payload.query, payload.user_id).await?;
	Ok(Json(ResolveResponse { candidates }))
}

async fn retrieve(
	State(state): State<AppState>,
	Json(payload): Json<RetrieveRequest>,
) -> Result<Response, ApiError> {
	match state.service.retrieve(&payload.candidate).await? {
		ResolvedTrack::Preview(preview) => Ok(Json(PreviewResponse {
			kind: "preview",
			track_id: preview.track_id,
			url: preview.url,
			title: preview.title,
			artist: preview.artist,
			album: preview.album,
		})
		.into_response()),
		ResolvedTrack::Downloaded(track) => {
			let read = tokio::fs::read(track.path()).await;
			let content_type = audio_content_type(track.path());
			let disposition = content_disposition(track.file_name());

			if let Err(err) = track.close() {
				tracing::warn!(error = %err, "Scratch directory cleanup failed.");
			}

			let bytes = read.map_err(ServiceError::from)?;
			let mut response = Body::from(bytes).into_response();
			let headers = response.headers_mut();

			headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
			headers.insert(header::CONTENT_DISPOSITION, disposition);

			Ok(response)
		},
	}
}

async fn play(
	State(state): State<AppState>,
	Json(payload): Json<PlayRequest>,
) -> Result<Json<PlayResponse>, ApiError> {
	let sink = CollectingSink::default();
	let outcome = state.service.play(&payload.text, payload.user_id, &sink).await?;
	let (outcome, track) = match outcome {
		PlayOutcome::NotAPlayRequest => ("not_a_play_request", None),
		PlayOutcome::MissingQuery => ("missing_query", None),
		PlayOutcome::NoResults => ("no_results", None),
		PlayOutcome::Played(candidate) => ("played", Some(candidate)),
	};
	let CollectingSink { messages, audio } = sink;

	Ok(Json(PlayResponse {
		outcome,
		track,
		messages: messages.into_inner().unwrap_or_else(|err| err.into_inner()),
		audio: audio.into_inner().unwrap_or_else(|err| err.into_inner()),
	}))
}

async fn get_preference(
	State(state): State<AppState>,
	Path(user_id): Path<UserId>,
) -> Json<UserPreference> {
	Json(state.service.preferences.get(user_id))
}

async fn set_preference(
	State(state): State<AppState>,
	Path(user_id): Path<UserId>,
	Json(payload): Json<UserPreference>,
) -> Result<Json<UserPreference>, ApiError> {
	state.service.preferences.set(user_id, payload)?;
	Ok(Json(state.service.preferences.get(user_id)))
}

async fn clear_preference(State(state): State<AppState>, Path(user_id): Path<UserId>) -> StatusCode {
	state.service.preferences.clear(user_id);
	StatusCode::NO_CONTENT
}

#[derive(Default)]
struct CollectingSink {
	messages: Mutex<Vec<String>>,
	audio: Mutex<Option<PlayedAudio>>,
}
impl TrackSink for CollectingSink {
	fn deliver_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, nagham_service::Result<()>> {
		self.messages.lock().unwrap_or_else(|err| err.into_inner()).push(text.to_string());

		Box::pin(async move { Ok(()) })
	}

	fn deliver_audio<'a>(
		&'a self,
		audio: AudioDelivery<'a>,
	) -> BoxFuture<'a, nagham_service::Result<()>> {
		Box::pin(async move {
			let played = match audio {
				AudioDelivery::Preview { url, title, artist } => PlayedAudio::Preview {
					url: url.to_string(),
					title: title.to_string(),
					artist: artist.to_string(),
				},
				AudioDelivery::File { path, file_name, title, artist } => {
					let metadata = tokio::fs::metadata(path).await.map_err(|err| {
						ServiceError::Delivery { message: format!("Cannot read {file_name}: {err}") }
					})?;

					PlayedAudio::File {
						file_name: file_name.to_string(),
						title: title.to_string(),
						artist: artist.to_string(),
						size_bytes: metadata.len(),
					}
				},
			};

			*self.audio.lock().unwrap_or_else(|err| err.into_inner()) = Some(played);

			Ok(())
		})
	}
}

fn audio_content_type(path: &FsPath) -> &'static str {
	let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();

	match extension.to_ascii_lowercase().as_str() {
		"mp3" => "audio/mpeg",
		"m4a" | "mp4" | "aac" => "audio/mp4",
		"ogg" | "opus" => "audio/ogg",
		"wav" => "audio/wav",
		"flac" => "audio/flac",
		_ => "application/octet-stream",
	}
}

fn content_disposition(file_name: &str) -> HeaderValue {
	HeaderValue::from_bytes(format!("attachment; filename=\"{file_name}\"").as_bytes())
		.unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let status = match &err {
			ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
			ServiceError::NoPreviewAvailable { .. } => StatusCode::NOT_FOUND,
			ServiceError::Configuration { .. } => StatusCode::SERVICE_UNAVAILABLE,
			ServiceError::DownloadFailed { .. }
			| ServiceError::TranscodeFailed { .. }
			| ServiceError::Delivery { .. } => StatusCode::BAD_GATEWAY,
			ServiceError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		};

		if status.is_server_error() {
			tracing::warn!(error = %err, code = err.code(), "Request failed.");
		}

		ApiError::new(status, err.code(), err.to_string())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };
		(self.status, Json(body)).into_response()
	}
}
