use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot read nagham config {}: {source}", path.display())]
	ReadConfig { path: PathBuf, source: std::io::Error },
	/// Also covers unknown provider names and mistyped values, which serde rejects while parsing.
	#[error("nagham config {} is not valid TOML for this service: {source}", path.display())]
	ParseConfig { path: PathBuf, source: toml::de::Error },
	#[error("Invalid nagham config: {message}")]
	Validation { message: String },
}
