//! Wrapper around the external download-and-transcode tool (`yt-dlp` compatible).

use std::{
	ffi::OsString,
	io::ErrorKind,
	path::{Path, PathBuf},
	process::Stdio,
	time::Duration as StdDuration,
};

use serde::Serialize;
use serde_json::Value;
use tokio::{fs, process::Command, time};

use crate::{Error, Result};
use nagham_config::Download;

const PROBE_TIMEOUT_MS: u64 = 10_000;
const MAX_DIAGNOSTIC_CHARS: usize = 200;
const TRANSCODE_MARKERS: &[&str] = &[
	"ffmpeg",
	"ffprobe",
	"postprocess",
	"conversion failed",
	"audio conversion",
	"unable to convert",
	"embedding metadata",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
	Download,
	Transcode,
}

/// Result of one successful tool run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedAudio {
	pub path: PathBuf,
	pub title: Option<String>,
	/// First non-empty of artist, creator and uploader.
	pub artist: Option<String>,
}

/// Checks that the tool can be executed and returns its version string.
pub async fn probe(cfg: &Download) -> Result<String> {
	let child = Command::new(&cfg.tool_path)
		.arg("--version")
		.stdin(Stdio::null())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.kill_on_drop(true)
		.spawn()
		.map_err(|err| spawn_error(&cfg.tool_path, err))?;
	let output = time::timeout(
		StdDuration::from_millis(PROBE_TIMEOUT_MS),
		child.wait_with_output(),
	)
	.await
	.map_err(|_| Error::Timeout { what: format!("probing {}", cfg.tool_path) })??;

	if !output.status.success() {
		return Err(Error::ToolMissing { tool: cfg.tool_path.clone() });
	}

	Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Downloads the best audio stream of `url` into `out_dir`, transcodes it to the configured
/// format and embeds title/artist tags. The child process is killed if the returned future is
/// dropped or the configured timeout elapses.
pub async fn fetch_audio(cfg: &Download, url: &str, out_dir: &Path) -> Result<FetchedAudio> {
	let cookies = cookies_file(cfg).await;
	let child = Command::new(&cfg.tool_path)
		.args(build_args(cfg, url, out_dir, cookies))
		.stdin(Stdio::null())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.kill_on_drop(true)
		.spawn()
		.map_err(|err| spawn_error(&cfg.tool_path, err))?;

	tracing::info!(tool = %cfg.tool_path, url, "Download tool started.");

	let output = time::timeout(StdDuration::from_millis(cfg.timeout_ms), child.wait_with_output())
		.await
		.map_err(|_| Error::Timeout { what: format!("downloading {url}") })??;

	if !output.status.success() {
		let stderr = String::from_utf8_lossy(&output.stderr);

		return Err(Error::ToolFailed {
			stage: failure_stage(&stderr),
			message: summarize_diagnostic(&stderr),
		});
	}

	let stdout = String::from_utf8_lossy(&output.stdout);
	let info = last_json_object(&stdout).unwrap_or(Value::Null);
	let reported = match crate::json_str(&info, "filepath") {
		Some(path) => file_within(out_dir, Path::new(&path)).await,
		None => None,
	};
	let path = match reported {
		Some(path) => path,
		None => find_output(out_dir, &cfg.audio_format).await?.ok_or_else(|| {
			Error::ToolFailed {
				stage: FailureStage::Transcode,
				message: format!("No {} file was produced.", cfg.audio_format),
			}
		})?,
	};

	Ok(FetchedAudio {
		path,
		title: crate::json_str(&info, "title"),
		artist: ["artist", "creator", "uploader"].iter().find_map(|key| crate::json_str(&info, key)),
	})
}

/// Canonical path of `path` when it names a regular file inside `dir`. Both sides are resolved
/// first, so `..` components and symlinks cannot escape `dir`.
pub async fn file_within(dir: &Path, path: &Path) -> Option<PathBuf> {
	let root = fs::canonicalize(dir).await.ok()?;
	let path = fs::canonicalize(path).await.ok()?;
	let metadata = fs::metadata(&path).await.ok()?;

	(path.starts_with(&root) && metadata.is_file()).then_some(path)
}

/// The configured cookies file, when it exists as a regular file.
pub async fn cookies_file(cfg: &Download) -> Option<&Path> {
	let path = cfg.cookies_file.as_deref()?;

	match fs::metadata(path).await {
		Ok(metadata) if metadata.is_file() => Some(path),
		Ok(_) => None,
		Err(err) => {
			tracing::warn!(path = %path.display(), error = %err, "Cookies file is not readable.");

			None
		},
	}
}

pub fn build_args(cfg: &Download, url: &str, out_dir: &Path, cookies: Option<&Path>) -> Vec<OsString> {
	let mut args: Vec<OsString> = [
		"--format",
		"bestaudio/best",
		"--no-playlist",
		"--no-progress",
		"--no-simulate",
		"--print",
		"after_move:%()j",
		"--extract-audio",
		"--audio-format",
		cfg.audio_format.as_str(),
		"--audio-quality",
		cfg.audio_quality.as_str(),
		"--embed-metadata",
		"--parse-metadata",
		"%(artist,creator,uploader)s:%(meta_artist)s",
	]
	.into_iter()
	.map(OsString::from)
	.collect();

	args.push("--output".into());
	args.push(out_dir.join("%(id)s.%(ext)s").into_os_string());

	if let Some(cookies) = cookies {
		args.push("--cookies".into());
		args.push(cookies.as_os_str().to_os_string());
	}

	args.push("--".into());
	args.push(url.into());

	args
}

/// Decides which pipeline stage a tool diagnostic belongs to.
pub fn failure_stage(stderr: &str) -> FailureStage {
	let lowered = stderr.to_lowercase();

	if TRANSCODE_MARKERS.iter().any(|marker| lowered.contains(marker)) {
		FailureStage::Transcode
	} else {
		FailureStage::Download
	}
}

/// Picks the most useful single line of tool output, without the `ERROR:` prefix.
pub fn summarize_diagnostic(stderr: &str) -> String {
	let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
	let line = lines
		.iter()
		.rev()
		.find(|line| line.starts_with("ERROR:"))
		.or_else(|| lines.last())
		.copied()
		.unwrap_or("Download tool failed without output.");
	let line = line.strip_prefix("ERROR:").map(str::trim).unwrap_or(line);

	line.chars().take(MAX_DIAGNOSTIC_CHARS).collect()
}

fn spawn_error(tool: &str, err: std::io::Error) -> Error {
	match err.kind() {
		ErrorKind::NotFound | ErrorKind::PermissionDenied => Error::ToolMissing { tool: tool.to_string() },
		_ => Error::Io(err),
	}
}

fn last_json_object(stdout: &str) -> Option<Value> {
	stdout
		.lines()
		.rev()
		.filter_map(|line| serde_json::from_str::<Value>(line.trim()).ok())
		.find(Value::is_object)
}

async fn find_output(out_dir: &Path, extension: &str) -> Result<Option<PathBuf>> {
	let mut entries = fs::read_dir(out_dir).await?;

	while let Some(entry) = entries.next_entry().await? {
		let path = entry.path();
		let matches = path
			.extension()
			.and_then(|ext| ext.to_str())
			.map(|ext| ext.eq_ignore_ascii_case(extension))
			.unwrap_or(false);

		if matches && entry.file_type().await?.is_file() {
			return Ok(Some(path));
		}
	}

	Ok(None)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classifies_transcode_failures() {
		let stderr = "WARNING: something\nERROR: Postprocessing: ffprobe and ffmpeg not found.";

		assert_eq!(failure_stage(stderr), FailureStage::Transcode);
		assert_eq!(failure_stage("ERROR: Unsupported URL: https://x"), FailureStage::Download);
	}

	#[test]
	fn summary_prefers_last_error_line() {
		let stderr = "ERROR: first\n[info] noise\nERROR: [youtube] abc: Video unavailable\n\n";

		assert_eq!(summarize_diagnostic(stderr), "[youtube] abc: Video unavailable");
		assert_eq!(summarize_diagnostic(""), "Download tool failed without output.");
		assert_eq!(summarize_diagnostic(&"x".repeat(500)).len(), MAX_DIAGNOSTIC_CHARS);
	}

	#[test]
	fn finds_last_json_line() {
		let stdout = "[download] 100%\n{\"title\":\"Baba\"}\n[done]\n";

		assert_eq!(last_json_object(stdout), Some(serde_json::json!({ "title": "Baba" })));
		assert_eq!(last_json_object("no json here"), None);
	}

	#[test]
	fn args_end_with_url_after_separator() {
		let cfg = Download::default();
		let args =
			build_args(&cfg, "https://www.youtube.com/watch?v=x", Path::new("/tmp/job"), None);
		let n = args.len();

		assert_eq!(args[n - 2], OsString::from("--"));
		assert_eq!(args[n - 1], OsString::from("https://www.youtube.com/watch?v=x"));
		assert!(args.contains(&OsString::from("mp3")));
		assert!(!args.contains(&OsString::from("--cookies")));
	}

	#[test]
	fn cookies_are_passed_before_the_url() {
		let cfg = Download::default();
		let args = build_args(
			&cfg,
			"https://www.youtube.com/watch?v=x",
			Path::new("/tmp/job"),
			Some(Path::new("/srv/cookies.txt")),
		);
		let at = args.iter().position(|arg| arg == "--cookies").expect("cookies flag present");

		assert_eq!(args[at + 1], OsString::from("/srv/cookies.txt"));
		assert!(at < args.len() - 2);
	}
}
