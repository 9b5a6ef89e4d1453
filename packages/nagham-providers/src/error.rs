use crate::download::FailureStage;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error("External tool {tool:?} is not available.")]
	ToolMissing { tool: String },
	#[error("{message}")]
	ToolFailed { stage: FailureStage, message: String },
	#[error("Timed out while {what}.")]
	Timeout { what: String },
}
