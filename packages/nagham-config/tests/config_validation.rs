use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use nagham_config::{Error, ProviderKind};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let mut table = root.as_table_mut().expect("Template config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos =
		SystemTime::now().duration_since(UNIX_EPOCH).expect("System time must be valid.").as_nanos();
	let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
	let path = env::temp_dir().join(format!("nagham_config_{nanos}_{seq}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn validation_message(result: nagham_config::Result<nagham_config::Config>) -> String {
	match result {
		Err(Error::Validation { message }) => message,
		Err(other) => panic!("Expected validation error, got {other:?}."),
		Ok(_) => panic!("Expected validation error, got a config."),
	}
}

#[test]
fn loads_sample_config_from_disk() {
	let path = write_temp_config(SAMPLE_CONFIG_TEMPLATE_TOML.to_string());
	let cfg = nagham_config::load(&path).expect("Sample config must load.");

	fs::remove_file(&path).expect("Failed to remove test config.");

	assert_eq!(cfg.resolve.default_provider, ProviderKind::Video);
	assert_eq!(cfg.resolve.default_regions, vec!["eg", "sa", "ae", "us", "gb"]);
	assert!(cfg.providers.video.is_some());
	assert!(cfg.providers.catalog.is_some());
	assert!(cfg.download.cookies_file.is_none());
}

#[test]
fn missing_file_reports_read_error() {
	let path = env::temp_dir().join("nagham_config_does_not_exist.toml");
	let err = nagham_config::load(&path).expect_err("Missing file must fail.");

	assert!(matches!(err, Error::ReadConfig { .. }));
	assert!(err.to_string().starts_with("Cannot read nagham config "));
	assert!(err.to_string().contains("nagham_config_does_not_exist.toml"));
}

#[test]
fn blank_video_key_disables_video_provider() {
	let payload = sample_toml_with("providers.video", "api_key", Value::String("  ".to_string()));
	let cfg = nagham_config::parse(&payload).expect("Blank key must not be fatal.");

	assert!(cfg.providers.video.is_none());
	assert!(cfg.providers.catalog.is_some());
}

#[test]
fn region_codes_are_normalized_and_deduplicated() {
	let regions = Value::Array(
		[" EG", "sa", "eg", "Us "].into_iter().map(|r| Value::String(r.to_string())).collect(),
	);
	let payload = sample_toml_with("resolve", "default_regions", regions);
	let cfg = nagham_config::parse(&payload).expect("Config must load.");

	assert_eq!(cfg.resolve.default_regions, vec!["eg", "sa", "us"]);
}

#[test]
fn rejects_malformed_region_code() {
	let regions = Value::Array(vec![Value::String("egy".to_string())]);
	let payload = sample_toml_with("resolve", "default_regions", regions);
	let message = validation_message(nagham_config::parse(&payload));

	assert!(message.contains("two-letter region code"), "unexpected message: {message}");
}

#[test]
fn rejects_empty_region_list() {
	let payload = sample_toml_with("resolve", "default_regions", Value::Array(Vec::new()));

	assert_eq!(
		validation_message(nagham_config::parse(&payload)),
		"resolve.default_regions must be non-empty."
	);
}

#[test]
fn rejects_zero_limits() {
	let payload = sample_toml_with("resolve", "video_result_limit", Value::Integer(0));

	assert_eq!(
		validation_message(nagham_config::parse(&payload)),
		"resolve.video_result_limit must be greater than zero."
	);
}

#[test]
fn rejects_result_limit_above_rank_limit() {
	let payload = sample_toml_with("resolve", "catalog_result_limit", Value::Integer(31));

	assert_eq!(
		validation_message(nagham_config::parse(&payload)),
		"resolve.catalog_result_limit must not exceed resolve.catalog_rank_limit."
	);
}

#[test]
fn rejects_zero_download_timeout() {
	let payload = sample_toml_with("download", "timeout_ms", Value::Integer(0));

	assert_eq!(
		validation_message(nagham_config::parse(&payload)),
		"download.timeout_ms must be greater than zero."
	);
}

#[test]
fn unknown_default_provider_fails_to_parse() {
	let payload =
		sample_toml_with("resolve", "default_provider", Value::String("radio".to_string()));
	let err = nagham_config::parse(&payload).expect_err("Unknown provider must fail.");

	assert!(matches!(err, Error::ParseConfig { .. }));
	assert!(err.to_string().starts_with("nagham config <memory> is not valid TOML"));
}

#[test]
fn minimal_config_uses_defaults() {
	let cfg = nagham_config::parse("[service]\nhttp_bind = \"127.0.0.1:0\"\n")
		.expect("Minimal config must load.");

	assert!(cfg.providers.video.is_none());
	assert!(cfg.providers.catalog.is_none());
	assert_eq!(cfg.resolve.catalog_rank_limit, 30);
	assert_eq!(cfg.resolve.catalog_result_limit, 10);
	assert_eq!(cfg.download.tool_path, "yt-dlp");
	assert_eq!(cfg.service.log_level, "info");
}

#[test]
fn validation_errors_name_the_config() {
	let payload = sample_toml_with("download", "timeout_ms", Value::Integer(0));
	let err = nagham_config::parse(&payload).expect_err("Zero timeout must fail.");

	assert_eq!(
		err.to_string(),
		"Invalid nagham config: download.timeout_ms must be greater than zero."
	);
}
