use unicode_normalization::UnicodeNormalization;

pub const FALLBACK_STEM: &str = "audio";

const MAX_STEM_CHARS: usize = 120;
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const RESERVED_STEMS: &[&str] = &[
	"con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
	"com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Builds a display filename from a provider title. Path separators, control characters and
/// reserved punctuation are dropped; an empty result falls back to [`FALLBACK_STEM`].
pub fn safe_file_name(title: &str, extension: &str) -> String {
	let stem = safe_stem(title);
	let extension: String = extension.chars().filter(|ch| ch.is_ascii_alphanumeric()).collect();

	if extension.is_empty() { stem } else { format!("{stem}.{}", extension.to_ascii_lowercase()) }
}

pub fn safe_stem(title: &str) -> String {
	let cleaned: String = title
		.nfc()
		.map(|ch| if ch.is_control() || RESERVED.contains(&ch) { ' ' } else { ch })
		.collect();
	let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
	let trimmed = collapsed.trim_matches(|ch: char| ch == '.' || ch.is_whitespace());
	let mut stem: String = trimmed.chars().take(MAX_STEM_CHARS).collect();

	stem = stem.trim_end_matches(|ch: char| ch == '.' || ch.is_whitespace()).to_string();

	if stem.is_empty() {
		return FALLBACK_STEM.to_string();
	}
	if RESERVED_STEMS.contains(&stem.to_ascii_lowercase().as_str()) {
		return format!("_{stem}");
	}

	stem
}
