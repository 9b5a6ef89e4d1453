use serde_json::Value;

use crate::{Error, RawCandidate, Result, TrackHandle};
use nagham_config::{ProviderKind, VideoProviderConfig};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const MAX_RESULTS: u32 = 50;
const VIDEO_ID_LEN: usize = 11;

/// Searches the music category of the video-hosting provider. Rows come back in provider order.
pub async fn search(
	cfg: &VideoProviderConfig,
	query: &str,
	region: Option<&str>,
	limit: u32,
) -> Result<Vec<RawCandidate>> {
	if cfg.api_key.trim().is_empty() {
		return Err(Error::InvalidConfig { message: "Video provider api_key is empty.".to_string() });
	}

	let client = crate::http_client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let max_results = limit.clamp(1, MAX_RESULTS).to_string();
	let region_code = region.map(str::to_ascii_uppercase);
	let mut params = vec![
		("part", "snippet"),
		("type", "video"),
		("videoCategoryId", cfg.category_id.as_str()),
		("maxResults", max_results.as_str()),
		("q", query),
		("key", cfg.api_key.as_str()),
	];

	if let Some(code) = region_code.as_deref() {
		params.push(("regionCode", code));
	}

	let res = client.get(url).query(&params).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(&json, region, limit as usize)
}

pub fn watch_url(video_id: &str) -> String {
	format!("{WATCH_URL}{video_id}")
}

/// Inverse of [`watch_url`]. Anything that is not exactly a canonical watch URL with a
/// well-formed video id yields `None`.
pub fn video_id(url: &str) -> Option<&str> {
	let id = url.strip_prefix(WATCH_URL)?;
	let well_formed = id.len() == VIDEO_ID_LEN
		&& id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

	well_formed.then_some(id)
}

fn parse_search_response(
	json: &Value,
	region: Option<&str>,
	limit: usize,
) -> Result<Vec<RawCandidate>> {
	let items = json.get("items").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Video search response is missing items array.".to_string() }
	})?;
	let mut out = Vec::with_capacity(items.len().min(limit));

	for item in items {
		if out.len() >= limit {
			break;
		}

		let Some(video_id) = item.get("id").and_then(|id| crate::json_str(id, "videoId")) else {
			continue;
		};
		let snippet = item.get("snippet").cloned().unwrap_or(Value::Null);
		let title = crate::json_str(&snippet, "title").map(|t| unescape_html(&t)).unwrap_or_default();
		let attribution = crate::json_str(&snippet, "channelTitle")
			.map(|t| unescape_html(&t))
			.unwrap_or_default();

		out.push(RawCandidate {
			provider: ProviderKind::Video,
			title,
			attribution,
			handle: TrackHandle::VideoUrl(watch_url(&video_id)),
			album: None,
			preview_url: None,
			region: region.map(str::to_string),
		});
	}

	Ok(out)
}

// The search API HTML-escapes snippet text.
fn unescape_html(text: &str) -> String {
	text.replace("&quot;", "\"")
		.replace("&#39;", "'")
		.replace("&#039;", "'")
		.replace("&lt;", "<")
		.replace("&gt;", ">")
		.replace("&amp;", "&")
}
