use serde_json::Value;

use crate::{Error, RawCandidate, Result, TrackHandle};
use nagham_config::{CatalogProviderConfig, ProviderKind};

/// Which catalog field a search term is matched against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchAttribute {
	SongName,
	ArtistName,
}
impl SearchAttribute {
	pub const ALL: [Self; 2] = [Self::SongName, Self::ArtistName];

	pub fn as_param(self) -> &'static str {
		match self {
			Self::SongName => "songTerm",
			Self::ArtistName => "artistTerm",
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::SongName => "song",
			Self::ArtistName => "artist",
		}
	}
}

pub async fn search(
	cfg: &CatalogProviderConfig,
	term: &str,
	country: &str,
	attribute: SearchAttribute,
) -> Result<Vec<RawCandidate>> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.search_path);
	let limit = cfg.per_call_limit.to_string();
	let params = [
		("term", term),
		("country", country),
		("media", "music"),
		("entity", cfg.entity.as_str()),
		("attribute", attribute.as_param()),
		("limit", limit.as_str()),
	];
	let res = client.get(url).query(&params).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_results(&json, Some(country))
}

/// Re-fetches one track by its numeric id. `Ok(None)` when the catalog no longer lists it.
pub async fn lookup(
	cfg: &CatalogProviderConfig,
	track_id: u64,
	country: Option<&str>,
) -> Result<Option<RawCandidate>> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.lookup_path);
	let id = track_id.to_string();
	let mut params = vec![("id", id.as_str())];

	if let Some(country) = country {
		params.push(("country", country));
	}

	let res = client.get(url).query(&params).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(parse_results(&json, country)?
		.into_iter()
		.find(|row| row.handle == TrackHandle::TrackId(track_id)))
}

fn parse_results(json: &Value, country: Option<&str>) -> Result<Vec<RawCandidate>> {
	let results = json.get("results").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Catalog response is missing results array.".to_string() }
	})?;
	let mut out = Vec::with_capacity(results.len());

	for row in results {
		let Some(track_id) = row.get("trackId").and_then(|v| v.as_u64()) else { continue };

		out.push(RawCandidate {
			provider: ProviderKind::Catalog,
			title: crate::json_str(row, "trackName").unwrap_or_default(),
			attribution: crate::json_str(row, "artistName").unwrap_or_default(),
			handle: TrackHandle::TrackId(track_id),
			album: crate::json_str(row, "collectionName"),
			preview_url: crate::json_str(row, "previewUrl"),
			region: country.map(str::to_string),
		});
	}

	Ok(out)
}
