mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	CatalogProviderConfig, Config, Download, ProviderKind, Providers, Resolve, Service,
	VideoProviderConfig,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } => Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

/// Parses, normalizes and validates a config document that is already in memory.
pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: "<memory>".into(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	if let Some(video) = cfg.providers.video.as_ref() {
		if video.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "providers.video.api_base must be non-empty.".to_string(),
			});
		}
		if video.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "providers.video.timeout_ms must be greater than zero.".to_string(),
			});
		}
	}
	if let Some(catalog) = cfg.providers.catalog.as_ref() {
		if catalog.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "providers.catalog.api_base must be non-empty.".to_string(),
			});
		}
		if catalog.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "providers.catalog.timeout_ms must be greater than zero.".to_string(),
			});
		}
		if catalog.per_call_limit == 0 {
			return Err(Error::Validation {
				message: "providers.catalog.per_call_limit must be greater than zero.".to_string(),
			});
		}
	}

	let resolve = &cfg.resolve;

	if resolve.default_regions.is_empty() {
		return Err(Error::Validation {
			message: "resolve.default_regions must be non-empty.".to_string(),
		});
	}

	for region in &resolve.default_regions {
		if !is_region_code(region) {
			return Err(Error::Validation {
				message: format!(
					"resolve.default_regions entry {region:?} must be a two-letter region code."
				),
			});
		}
	}

	for (label, value) in [
		("resolve.video_fetch_limit", resolve.video_fetch_limit),
		("resolve.video_result_limit", resolve.video_result_limit),
		("resolve.catalog_rank_limit", resolve.catalog_rank_limit),
		("resolve.catalog_result_limit", resolve.catalog_result_limit),
	] {
		if value == 0 {
			return Err(Error::Validation { message: format!("{label} must be greater than zero.") });
		}
	}

	if resolve.catalog_result_limit > resolve.catalog_rank_limit {
		return Err(Error::Validation {
			message: "resolve.catalog_result_limit must not exceed resolve.catalog_rank_limit."
				.to_string(),
		});
	}
	if cfg.download.tool_path.trim().is_empty() {
		return Err(Error::Validation {
			message: "download.tool_path must be non-empty.".to_string(),
		});
	}
	if cfg.download.audio_format.trim().is_empty() {
		return Err(Error::Validation {
			message: "download.audio_format must be non-empty.".to_string(),
		});
	}
	if cfg.download.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "download.timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

/// Two ASCII letters, lowercase.
pub fn is_region_code(code: &str) -> bool {
	code.len() == 2 && code.bytes().all(|b| b.is_ascii_lowercase())
}

fn normalize(cfg: &mut Config) {
	if cfg.providers.video.as_ref().map(|video| video.api_key.trim().is_empty()).unwrap_or(false) {
		cfg.providers.video = None;
	}

	let mut regions: Vec<String> = Vec::with_capacity(cfg.resolve.default_regions.len());

	for region in &cfg.resolve.default_regions {
		let region = region.trim().to_ascii_lowercase();

		if !regions.contains(&region) {
			regions.push(region);
		}
	}

	cfg.resolve.default_regions = regions;

	if cfg.download.cookies_file.as_deref().map(|p| p.as_os_str().is_empty()).unwrap_or(false) {
		cfg.download.cookies_file = None;
	}
	if cfg.download.temp_root.as_deref().map(|p| p.as_os_str().is_empty()).unwrap_or(false) {
		cfg.download.temp_root = None;
	}
}
