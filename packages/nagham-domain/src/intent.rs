use crate::normalize;

/// Words that turn a chat message into a play request. Compared after normalization, so
/// "أغنية" and "اغنية" are the same trigger.
pub const PLAY_TRIGGERS: &[&str] = &["شغل", "شغلي", "اغنية", "play"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayRequest {
	/// Message text with trigger words removed, as typed (not normalized).
	pub query: String,
}

/// Returns the song query when `text` carries a play trigger word, `None` otherwise. The query
/// is empty when the message holds nothing but triggers.
pub fn parse_play_request(text: &str) -> Option<PlayRequest> {
	let mut found = false;
	let mut kept = Vec::new();

	for word in text.split_whitespace() {
		let canonical = normalize(word.trim_start_matches('/'));

		if PLAY_TRIGGERS.contains(&canonical.as_str()) {
			found = true;

			continue;
		}

		kept.push(word);
	}

	found.then(|| PlayRequest { query: kept.join(" ") })
}

#[cfg(test)]
mod tests {
	use super::parse_play_request;

	#[test]
	fn arabic_trigger_is_stripped() {
		let request = parse_play_request("شغل عمرو دياب بابا").expect("trigger must match");

		assert_eq!(request.query, "عمرو دياب بابا");
	}

	#[test]
	fn hamza_variant_matches() {
		assert!(parse_play_request("أغنية بابا").is_some());
	}

	#[test]
	fn slash_command_matches() {
		let request = parse_play_request("/play Shakira").expect("trigger must match");

		assert_eq!(request.query, "Shakira");
	}

	#[test]
	fn plain_text_is_not_a_request() {
		assert_eq!(parse_play_request("hello there"), None);
		assert_eq!(parse_play_request("playlist"), None);
	}

	#[test]
	fn trigger_only_yields_empty_query() {
		assert_eq!(parse_play_request("شغلي").map(|r| r.query), Some(String::new()));
	}
}
