use std::collections::HashSet;

use crate::Candidate;
use nagham_domain::{normalize, normalize_title};
use nagham_providers::RawCandidate;

pub const TITLE_SUBSTRING_BONUS: f32 = 3.0;
pub const COMBINED_SUBSTRING_BONUS: f32 = 3.0;
pub const TITLE_TOKEN_WEIGHT: f32 = 1.5;
pub const ATTRIBUTION_TOKEN_WEIGHT: f32 = 1.0;

/// Relevance of one raw row to the query. Higher is better; zero means no lexical overlap.
pub fn score(query: &str, candidate: &RawCandidate) -> f32 {
	score_normalized(
		&normalize(query),
		&normalize_title(&candidate.title),
		&normalize(&candidate.attribution),
	)
}

/// Scores every row, sorts descending (stable, so ties keep input order) and keeps the top `n`.
pub fn best_n(query: &str, candidates: Vec<RawCandidate>, n: usize) -> Vec<Candidate> {
	let query = normalize(query);
	let mut scored: Vec<Candidate> = candidates
		.into_iter()
		.map(|raw| {
			let title = normalize_title(&raw.title);
			let score = score_normalized(&query, &title, &normalize(&raw.attribution));

			Candidate::from_raw(raw, title, score)
		})
		.collect();

	scored.sort_by(|a, b| b.score.total_cmp(&a.score));
	scored.truncate(n);

	scored
}

fn score_normalized(query: &str, title: &str, attribution: &str) -> f32 {
	if query.is_empty() {
		return 0.0;
	}

	let mut total = 0.0;

	if title.contains(query) {
		total += TITLE_SUBSTRING_BONUS;
	}
	if format!("{title} {attribution}").contains(query) {
		total += COMBINED_SUBSTRING_BONUS;
	}

	let query_tokens = tokens(query);

	total += TITLE_TOKEN_WEIGHT * shared_tokens(&query_tokens, title) as f32;
	total += ATTRIBUTION_TOKEN_WEIGHT * shared_tokens(&query_tokens, attribution) as f32;

	total
}

fn tokens(text: &str) -> HashSet<&str> {
	text.split_whitespace().collect()
}

fn shared_tokens(query_tokens: &HashSet<&str>, text: &str) -> usize {
	let text_tokens = tokens(text);

	query_tokens.iter().filter(|token| text_tokens.contains(*token)).count()
}
