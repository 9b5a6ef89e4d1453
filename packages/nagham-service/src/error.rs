use nagham_providers::download::FailureStage;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Configuration error: {message}")]
	Configuration { message: String },
	#[error("No preview is available for track {track_id}.")]
	NoPreviewAvailable { track_id: u64 },
	#[error("Download failed: {message}")]
	DownloadFailed { message: String },
	#[error("Transcode failed: {message}")]
	TranscodeFailed { message: String },
	#[error("I/O error: {message}")]
	Io { message: String },
	#[error("Delivery failed: {message}")]
	Delivery { message: String },
}
impl Error {
	/// Stable machine-readable code for boundary adapters.
	pub fn code(&self) -> &'static str {
		match self {
			Self::InvalidRequest { .. } => "INVALID_REQUEST",
			Self::Configuration { .. } => "CONFIGURATION_ERROR",
			Self::NoPreviewAvailable { .. } => "NO_PREVIEW_AVAILABLE",
			Self::DownloadFailed { .. } => "DOWNLOAD_FAILED",
			Self::TranscodeFailed { .. } => "TRANSCODE_FAILED",
			Self::Io { .. } => "IO_ERROR",
			Self::Delivery { .. } => "DELIVERY_FAILED",
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io { message: err.to_string() }
	}
}

/// Classifies a download-tool failure. Never exposes the raw transport error type.
impl From<nagham_providers::Error> for Error {
	fn from(err: nagham_providers::Error) -> Self {
		use nagham_providers::Error as ProviderError;

		match err {
			ProviderError::ToolMissing { tool } => Self::Configuration {
				message: format!("Download tool {tool:?} is not installed or not executable."),
			},
			ProviderError::ToolFailed { stage: FailureStage::Download, message } =>
				Self::DownloadFailed { message },
			ProviderError::ToolFailed { stage: FailureStage::Transcode, message } =>
				Self::TranscodeFailed { message },
			ProviderError::Timeout { what } =>
				Self::DownloadFailed { message: format!("Timed out while {what}.") },
			ProviderError::InvalidConfig { message } => Self::Configuration { message },
			ProviderError::Io(inner) => Self::Io { message: inner.to_string() },
			other => Self::DownloadFailed { message: other.to_string() },
		}
	}
}
