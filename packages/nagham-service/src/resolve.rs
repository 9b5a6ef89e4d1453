use serde::{Deserialize, Serialize};

use crate::{Error, NaghamService, Result, UserId, UserPreference, dedup, ranking};
use nagham_config::ProviderKind;
use nagham_domain::{normalize, normalize_title};
use nagham_providers::{RawCandidate, TrackHandle};

/// One incoming search request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
	pub text: String,
	pub user_id: UserId,
	pub provider: Option<ProviderKind>,
	pub region: Option<String>,
}
impl Query {
	pub fn new(text: &str, user_id: UserId, preference: UserPreference) -> Self {
		Self {
			text: text.to_string(),
			user_id,
			provider: preference.provider,
			region: preference.region,
		}
	}
}

/// A scored, deduplicated search result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
	pub normalized_title: String,
	pub display_title: String,
	pub attribution: String,
	/// Zero for video results, which keep provider order instead of being scored.
	pub score: f32,
	pub provider: ProviderKind,
	/// Opaque to callers; interpreted only by retrieval.
	pub handle: TrackHandle,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub album: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub preview_url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub region: Option<String>,
}
impl Candidate {
	pub(crate) fn from_raw(raw: RawCandidate, normalized_title: String, score: f32) -> Self {
		Self {
			normalized_title,
			display_title: raw.title,
			attribution: raw.attribution,
			score,
			provider: raw.provider,
			handle: raw.handle,
			album: raw.album,
			preview_url: raw.preview_url,
			region: raw.region,
		}
	}
}

impl NaghamService {
	/// Turns free text into a short, ranked list of playable candidates for `user_id`.
	///
	/// Provider failures degrade to fewer or no results. An empty list means "no results".
	/// The only error is a missing configuration for the provider the user selected.
	pub async fn resolve(&self, query_text: &str, user_id: UserId) -> Result<Vec<Candidate>> {
		let query = Query::new(query_text, user_id, self.preferences.get(user_id));

		self.resolve_query(&query).await
	}

	pub async fn resolve_query(&self, query: &Query) -> Result<Vec<Candidate>> {
		let normalized = normalize(&query.text);
		let provider = query.provider.unwrap_or(self.cfg.resolve.default_provider);

		if normalized.is_empty() {
			tracing::info!(user_id = query.user_id, "Query is empty after normalization.");

			return Ok(Vec::new());
		}

		let candidates = match provider {
			ProviderKind::Catalog => self.resolve_catalog(&normalized, query.region.as_deref()).await?,
			ProviderKind::Video => self.resolve_video(&normalized, query.region.as_deref()).await?,
		};

		tracing::info!(
			user_id = query.user_id,
			provider = provider.as_str(),
			results = candidates.len(),
			"Query resolved."
		);

		Ok(candidates)
	}

	async fn resolve_catalog(&self, query: &str, region: Option<&str>) -> Result<Vec<Candidate>> {
		if self.cfg.providers.catalog.is_none() {
			return Err(Error::Configuration {
				message: "Catalog provider is not configured.".to_string(),
			});
		}

		let resolve = &self.cfg.resolve;
		let search = self.aggregate(query, region).await;
		let ranked = ranking::best_n(query, search.rows, resolve.catalog_rank_limit as usize);

		Ok(dedup::dedup(ranked, resolve.catalog_result_limit as usize))
	}

	// Video search is relevance-ranked upstream, so rows keep provider order and are only
	// deduplicated.
	async fn resolve_video(&self, query: &str, region: Option<&str>) -> Result<Vec<Candidate>> {
		let Some(cfg) = self.cfg.providers.video.as_ref() else {
			return Err(Error::Configuration {
				message: "Video provider is not configured.".to_string(),
			});
		};
		let resolve = &self.cfg.resolve;
		let outcome = crate::search_outcome(
			cfg.timeout_ms,
			self.providers.video.search(cfg, query, region, resolve.video_fetch_limit),
		)
		.await;

		if let crate::ProviderOutcome::Unavailable { reason } = &outcome {
			tracing::warn!(provider = "video", region, error = %reason, "Provider call failed.");
		}

		let candidates = outcome
			.into_rows()
			.into_iter()
			.map(|raw| {
				let title = normalize_title(&raw.title);

				Candidate::from_raw(raw, title, 0.0)
			})
			.collect();

		Ok(dedup::dedup(candidates, resolve.video_result_limit as usize))
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn candidate_json_omits_absent_fields() {
		let candidate = Candidate {
			normalized_title: "baba".to_string(),
			display_title: "Baba".to_string(),
			attribution: "Amr Diab".to_string(),
			score: 7.5,
			provider: ProviderKind::Catalog,
			handle: TrackHandle::TrackId(42),
			album: None,
			preview_url: None,
			region: Some("eg".to_string()),
		};
		let value = serde_json::to_value(&candidate).expect("candidate serializes");

		assert_eq!(
			value,
			json!({
				"normalized_title": "baba",
				"display_title": "Baba",
				"attribution": "Amr Diab",
				"score": 7.5,
				"provider": "catalog",
				"handle": { "kind": "track_id", "value": 42 },
				"region": "eg",
			})
		);

		let back: Candidate = serde_json::from_value(value).expect("candidate deserializes");

		assert_eq!(back, candidate);
	}

	#[test]
	fn query_takes_user_preference() {
		let query = Query::new("baba", 9, UserPreference {
			provider: Some(ProviderKind::Catalog),
			region: Some("sa".to_string()),
		});

		assert_eq!(query.provider, Some(ProviderKind::Catalog));
		assert_eq!(query.region.as_deref(), Some("sa"));
	}
}
