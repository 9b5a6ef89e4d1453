use nagham_domain::{filename, normalize, normalize_title};

const SAMPLES: &[&str] = &[
	"",
	" ",
	"()[]{}",
	"- | — / ~",
	"((()))",
	"Song Title (Official Music Video) [Lyrics]",
	"Amr Diab - Baba",
	"عمرو دياب | بابا (فيديو كليب)",
	"Beyoncé — Halo (Live at Wembley) 4K",
	"official music live video",
	"live-live-live",
	"AC/DC :: Thunderstruck [HD] {Remastered 2003}",
	"  multiple    spaces\tand\nnewlines ",
	"Shakira - Waka Waka (This Time for Africa)",
	"-leading and trailing-",
	"İstanbul",
	"cover of a cover",
];

#[test]
fn noisy_title_matches_clean_title() {
	let clean = normalize_title("Song Title");

	assert_eq!(normalize_title("Song Title (Official Music Video) [Lyrics]"), clean);
	assert_eq!(normalize_title("Song Title - Official Video"), clean);
	assert_eq!(normalize_title("SONG TITLE | Lyrics"), clean);
	assert_eq!(normalize_title("Song Title [4K Remastered]"), clean);
}

#[test]
fn normalize_is_idempotent() {
	for sample in SAMPLES {
		let once = normalize(sample);

		assert_eq!(normalize(&once), once, "normalize not idempotent for {sample:?}");
	}
}

#[test]
fn normalize_title_is_idempotent() {
	for sample in SAMPLES {
		let once = normalize_title(sample);

		assert_eq!(normalize_title(&once), once, "normalize_title not idempotent for {sample:?}");
	}
}

#[test]
fn punctuation_only_inputs_are_empty() {
	assert_eq!(normalize("()[]{}"), "");
	assert_eq!(normalize("- | — / ~"), "");
	assert_eq!(normalize_title("!!!???"), "");
}

#[test]
fn file_names_never_contain_separators() {
	for sample in SAMPLES {
		let name = filename::safe_file_name(sample, "mp3");

		assert!(!name.contains('/') && !name.contains('\\'), "unsafe name {name:?}");
		assert!(name.ends_with(".mp3"));
		assert!(name.len() > ".mp3".len());
	}
}
