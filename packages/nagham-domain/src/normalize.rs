//! Canonical forms for free-text queries and provider-supplied titles.
//!
//! Both functions are total: any input, including empty or punctuation-only text, yields a
//! (possibly empty) string.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use unicode_script::{Script, UnicodeScript};

static BRACKETED: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"[\(\[\{][^\(\)\[\]\{\}]*[\)\]\}]").expect("bracket pattern must compile")
});

// Longer phrases come first so alternation prefers them over their prefixes.
static NOISE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?i)\b(?:official\s+music\s+video|official\s+lyrics?\s+video|official\s+video|official\s+audio|lyrics?\s+video|music\s+video|video\s+clip|official|lyrics?|remaster(?:ed)?|cover|live|4k|hd|hq|audio|visuali[sz]er|فيديو\s+كليب|كليب|كلمات|حصريا)\b",
	)
	.expect("noise pattern must compile")
});

const SEPARATORS: &[char] = &['|', '¦', '–', '—', '―', '/', '\\', '~', '•', '·', '_', ':', ';'];
const BRACKETS: &[char] = &['(', ')', '[', ']', '{', '}'];

/// Canonicalizes free text: lowercase, diacritics removed, bracketed content and noise words
/// stripped, separators turned into spaces, whitespace collapsed.
pub fn normalize(text: &str) -> String {
	let mut current = normalize_pass(text);

	// Stripping one noise token can join neighbours into another noise phrase, so run to a fixed
	// point. Every pass that changes the text removes characters or separators.
	loop {
		let next = normalize_pass(&current);

		if next == current {
			return current;
		}

		current = next;
	}
}

/// Stronger variant for provider titles: output is restricted to lowercase Latin letters,
/// digits, Arabic letters, spaces and hyphens.
pub fn normalize_title(raw_title: &str) -> String {
	let restricted: String = normalize(raw_title).chars().filter(|ch| is_title_char(*ch)).collect();

	// Filtering can expose noise words that were glued to dropped symbols.
	normalize(&restricted)
}

fn normalize_pass(text: &str) -> String {
	let lowered = text.to_lowercase();
	let folded: String = lowered.nfd().filter(|ch| !is_combining_mark(*ch)).nfc().collect();
	let unbracketed = strip_brackets(&folded);
	let separated = replace_separators(&unbracketed);
	let denoised = NOISE.replace_all(&separated, " ");

	collapse_whitespace(&denoised)
}

fn strip_brackets(text: &str) -> String {
	let mut current = text.to_string();

	while BRACKETED.is_match(&current) {
		current = BRACKETED.replace_all(&current, " ").into_owned();
	}

	current.chars().map(|ch| if BRACKETS.contains(&ch) { ' ' } else { ch }).collect()
}

fn replace_separators(text: &str) -> String {
	let chars: Vec<char> = text.chars().collect();
	let mut out = String::with_capacity(text.len());

	for (idx, ch) in chars.iter().copied().enumerate() {
		if SEPARATORS.contains(&ch) {
			out.push(' ');

			continue;
		}
		// A hyphen survives only inside a word, e.g. "a-ha".
		if ch == '-' {
			let before = idx.checked_sub(1).and_then(|i| chars.get(i));
			let after = chars.get(idx + 1);
			let joins_word = before.map(|c| c.is_alphanumeric()).unwrap_or(false)
				&& after.map(|c| c.is_alphanumeric()).unwrap_or(false);

			out.push(if joins_word { '-' } else { ' ' });

			continue;
		}

		out.push(ch);
	}

	out
}

fn collapse_whitespace(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_title_char(ch: char) -> bool {
	if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == ' ' || ch == '-' {
		return true;
	}

	ch.is_alphabetic() && ch.script() == Script::Arabic
}

#[cfg(test)]
mod tests {
	use super::{normalize, normalize_title};

	#[test]
	fn empty_and_blank_inputs_yield_empty() {
		assert_eq!(normalize(""), "");
		assert_eq!(normalize("   \t\n"), "");
		assert_eq!(normalize_title(""), "");
		assert_eq!(normalize_title(" | - — "), "");
	}

	#[test]
	fn strips_nested_brackets_and_noise() {
		assert_eq!(normalize("Baba (Live [2019]) - Official Video"), "baba");
		assert_eq!(normalize("Song {Remastered} | HD"), "song");
	}

	#[test]
	fn keeps_intra_word_hyphen() {
		assert_eq!(normalize("A-ha - Take On Me"), "a-ha take on me");
	}

	#[test]
	fn removes_latin_diacritics_and_arabic_marks() {
		assert_eq!(normalize("Beyoncé"), "beyonce");
		assert_eq!(normalize("بَابَا"), "بابا");
	}

	#[test]
	fn noise_words_match_on_word_boundaries_only() {
		assert_eq!(normalize("Oliver Coverdale"), "oliver coverdale");
		assert_eq!(normalize("Delivery"), "delivery");
	}

	#[test]
	fn exposed_noise_phrase_is_removed() {
		assert_eq!(normalize("music live video"), "");
	}

	#[test]
	fn title_alphabet_is_restricted() {
		assert_eq!(normalize_title("Amr Diab - Baba!! ♥ (Official)"), "amr diab baba");
		assert_eq!(normalize_title("عمرو دياب - بابا | كليب"), "عمرو دياب بابا");
		assert_eq!(normalize_title("Сергей Song"), "song");
	}

	#[test]
	fn arabic_noise_is_removed() {
		assert_eq!(normalize("بابا كلمات"), "بابا");
		assert_eq!(normalize("بابا فيديو كليب"), "بابا");
	}
}
