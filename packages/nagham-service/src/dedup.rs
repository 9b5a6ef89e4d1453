use std::collections::HashSet;

use crate::Candidate;

/// Keeps the first candidate per `(normalized title, lowercased attribution)` in input order,
/// drops candidates whose normalized title is empty, and stops after `limit` entries.
pub fn dedup(candidates: Vec<Candidate>, limit: usize) -> Vec<Candidate> {
	let mut seen = HashSet::new();
	let mut out = Vec::with_capacity(limit.min(candidates.len()));

	for candidate in candidates {
		if out.len() >= limit {
			break;
		}
		if candidate.normalized_title.is_empty() {
			continue;
		}

		let key = (candidate.normalized_title.clone(), candidate.attribution.trim().to_lowercase());

		if seen.insert(key) {
			out.push(candidate);
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use super::dedup;
	use crate::Candidate;
	use nagham_config::ProviderKind;
	use nagham_providers::TrackHandle;

	fn candidate(title: &str, attribution: &str, id: &str) -> Candidate {
		Candidate {
			normalized_title: title.to_string(),
			display_title: title.to_string(),
			attribution: attribution.to_string(),
			score: 0.0,
			provider: ProviderKind::Video,
			handle: TrackHandle::VideoUrl(id.to_string()),
			album: None,
			preview_url: None,
			region: None,
		}
	}

	#[test]
	fn first_occurrence_wins() {
		let out = dedup(
			vec![
				candidate("baba", "Amr Diab", "a"),
				candidate("baba", "amr diab ", "b"),
				candidate("baba", "Cover Band", "c"),
			],
			10,
		);
		let ids: Vec<_> = out.iter().map(|c| c.handle.clone()).collect();

		assert_eq!(
			ids,
			vec![TrackHandle::VideoUrl("a".to_string()), TrackHandle::VideoUrl("c".to_string())]
		);
	}

	#[test]
	fn empty_titles_are_dropped() {
		let out = dedup(vec![candidate("", "x", "a"), candidate("song", "x", "b")], 10);

		assert_eq!(out.len(), 1);
		assert_eq!(out[0].normalized_title, "song");
	}

	#[test]
	fn stops_at_limit_counting_distinct_entries() {
		let out = dedup(
			vec![
				candidate("a", "", "1"),
				candidate("a", "", "2"),
				candidate("b", "", "3"),
				candidate("c", "", "4"),
			],
			2,
		);
		let titles: Vec<_> = out.iter().map(|c| c.normalized_title.as_str()).collect();

		assert_eq!(titles, vec!["a", "b"]);
	}

	#[test]
	fn zero_limit_returns_nothing() {
		assert!(dedup(vec![candidate("a", "", "1")], 0).is_empty());
	}
}
