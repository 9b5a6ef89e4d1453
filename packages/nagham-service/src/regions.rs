use std::collections::HashSet;

use futures::future;

use crate::{NaghamService, ProviderOutcome};
use nagham_config::is_region_code;
use nagham_providers::{RawCandidate, TrackHandle, catalog::SearchAttribute};

/// Merged rows of one catalog fan-out, plus call accounting.
#[derive(Debug, Default)]
pub struct RegionalSearch {
	pub rows: Vec<RawCandidate>,
	pub regions: Vec<String>,
	pub calls: usize,
	pub failed_calls: usize,
}

/// Preferred region first, then the default order, each code once. A malformed preferred code
/// is ignored.
pub fn region_order(preferred: Option<&str>, defaults: &[String]) -> Vec<String> {
	let mut out: Vec<String> = Vec::with_capacity(defaults.len() + 1);
	let preferred = preferred.map(|code| code.trim().to_ascii_lowercase());

	for code in preferred.iter().chain(defaults.iter()) {
		if is_region_code(code) && !out.contains(code) {
			out.push(code.clone());
		}
	}

	out
}

impl NaghamService {
	/// Searches the catalog in every region of [`region_order`] with both attribute modes,
	/// concurrently. Rows are merged in region order (song mode before artist mode) and
	/// deduplicated by track id, first occurrence winning. Failed calls count as zero rows.
	///
	/// Returns an empty result when the catalog provider is not configured.
	pub async fn aggregate(&self, query: &str, user_region: Option<&str>) -> RegionalSearch {
		let Some(cfg) = self.cfg.providers.catalog.as_ref() else {
			return RegionalSearch::default();
		};
		let regions = region_order(user_region, &self.cfg.resolve.default_regions);
		let calls: Vec<(&str, SearchAttribute)> = regions
			.iter()
			.flat_map(|region| SearchAttribute::ALL.map(|attribute| (region.as_str(), attribute)))
			.collect();
		let outcomes = future::join_all(calls.iter().map(|(region, attribute)| {
			crate::search_outcome(
				cfg.timeout_ms,
				self.providers.catalog.search(cfg, query, region, *attribute),
			)
		}))
		.await;
		let mut search = RegionalSearch { calls: calls.len(), ..RegionalSearch::default() };
		let mut seen: HashSet<TrackHandle> = HashSet::new();

		for ((region, attribute), outcome) in calls.iter().zip(outcomes) {
			if let ProviderOutcome::Unavailable { reason } = &outcome {
				tracing::warn!(
					provider = "catalog",
					region,
					mode = attribute.as_str(),
					error = %reason,
					"Provider call failed."
				);

				search.failed_calls += 1;
			}

			for row in outcome.into_rows() {
				if seen.insert(row.handle.clone()) {
					search.rows.push(row);
				}
			}
		}

		tracing::info!(
			regions = regions.len(),
			calls = search.calls,
			failed_calls = search.failed_calls,
			rows = search.rows.len(),
			"Catalog fan-out finished."
		);

		search.regions = regions;

		search
	}
}
