//! Noise-token removal for track and artist strings.
//!
//! Video titles and channel names carry qualifiers ("Official Video",
//! "VEVO", "- Topic") that catalog entries lack. The normalizer strips a
//! configurable, case-insensitive token set, drops brackets left empty by
//! the removal, collapses whitespace and trims separators at both ends.
//!
//! Tokens are removed as plain substrings, so glued channel suffixes such
//! as "EminemVEVO" lose their token too. This also cuts into words that
//! contain a token ("Alive" becomes "A"); set
//! [`NormalizerConfig::word_boundary`] to only strip whole-word tokens.
//!
//! Normalization is idempotent: the cleanup passes repeat until the string
//! stops changing, so `normalize(normalize(x)) == normalize(x)` for every
//! input, including the empty string.

use regex::Regex;
use tracing::trace;

use crate::defaults::NOISE_TOKENS;
use crate::error::{Error, Result};
use crate::models::NormalizedQuery;

/// Characters trimmed from both ends after token removal.
const EDGE_SEPARATORS: &[char] = &['-', '–', '—', '|', ':', '·', ','];

/// Token set for the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    pub noise_tokens: Vec<String>,
    /// Only strip tokens standing as whole words.
    pub word_boundary: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            noise_tokens: NOISE_TOKENS.iter().map(|t| t.to_string()).collect(),
            word_boundary: false,
        }
    }
}

impl NormalizerConfig {
    /// Parse a comma-separated token list. Blank entries are dropped.
    pub fn from_csv(csv: &str) -> Self {
        Self {
            noise_tokens: csv
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            word_boundary: false,
        }
    }
}

/// Compiled noise-token remover.
#[derive(Debug, Clone)]
pub struct Normalizer {
    tokens: Option<Regex>,
    empty_brackets: Regex,
    whitespace: Regex,
}

impl Normalizer {
    /// Compile the token set into a single case-insensitive alternation.
    pub fn new(config: &NormalizerConfig) -> Result<Self> {
        let alternatives: Vec<String> = config
            .noise_tokens
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| token_pattern(t, config.word_boundary))
            .collect();

        let tokens = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i){}", alternatives.join("|"));
            Some(
                Regex::new(&pattern)
                    .map_err(|e| Error::Config(format!("Invalid noise token set: {}", e)))?,
            )
        };

        let empty_brackets = Regex::new(r"\(\s*\)|\[\s*\]|\{\s*\}")
            .map_err(|e| Error::Config(e.to_string()))?;
        let whitespace = Regex::new(r"\s{2,}").map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self {
            tokens,
            empty_brackets,
            whitespace,
        })
    }

    /// Clean a single string.
    pub fn normalize(&self, input: &str) -> String {
        let mut current = input.to_string();
        loop {
            let next = self.pass(&current);
            if next == current {
                break;
            }
            current = next;
        }
        trace!(input, output = %current, "Normalized text");
        current
    }

    /// Clean track and artist independently.
    pub fn normalize_query(&self, track: &str, artist: &str) -> NormalizedQuery {
        NormalizedQuery {
            track: self.normalize(track),
            artist: self.normalize(artist),
        }
    }

    fn pass(&self, input: &str) -> String {
        let stripped = match &self.tokens {
            Some(re) => re.replace_all(input, "").into_owned(),
            None => input.to_string(),
        };
        let stripped = self.empty_brackets.replace_all(&stripped, "");
        let collapsed = self.whitespace.replace_all(&stripped, " ");
        collapsed
            .trim_matches(|c: char| c.is_whitespace() || EDGE_SEPARATORS.contains(&c))
            .to_string()
    }
}

/// Escape a token, allowing any whitespace run between its words. With
/// `bounded`, word boundaries are anchored where the token starts/ends with
/// a word character.
fn token_pattern(token: &str, bounded: bool) -> String {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let body = token
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let lead = if bounded && is_word(token.chars().next()) { r"\b" } else { "" };
    let tail = if bounded && is_word(token.chars().last()) { r"\b" } else { "" };
    format!("{}{}{}", lead, body, tail)
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default()).expect("built-in noise tokens compile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n() -> Normalizer {
        Normalizer::default()
    }

    fn bounded() -> Normalizer {
        Normalizer::new(&NormalizerConfig {
            word_boundary: true,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(n().normalize(""), "");
    }

    #[test]
    fn test_strips_official_video_suffix() {
        assert_eq!(
            n().normalize("The Weeknd - Blinding Lights (Official Video)"),
            "The Weeknd - Blinding Lights"
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(n().normalize("Yesterday REMASTERED"), "Yesterday");
        assert_eq!(n().normalize("Song [4K]"), "Song");
    }

    #[test]
    fn test_strips_topic_channel() {
        assert_eq!(n().normalize("The Beatles - Topic"), "The Beatles");
    }

    #[test]
    fn test_strips_vevo_channel() {
        assert_eq!(n().normalize("TaylorSwiftVEVO"), "TaylorSwift");
        assert_eq!(n().normalize("Taylor Swift VEVO"), "Taylor Swift");
    }

    #[test]
    fn test_strips_glued_tokens() {
        assert_eq!(n().normalize("EminemVEVO"), "Eminem");
        assert_eq!(n().normalize("AdeleVEVO"), "Adele");
        assert_eq!(n().normalize("Song (Official Video4K)"), "Song");
    }

    #[test]
    fn test_substring_removal_cuts_into_words() {
        assert_eq!(n().normalize("Alive"), "A");
    }

    #[test]
    fn test_word_boundary_keeps_words_containing_tokens() {
        let normalizer = bounded();
        assert_eq!(normalizer.normalize("Alive"), "Alive");
        assert_eq!(normalizer.normalize("Olive Tree"), "Olive Tree");
        assert_eq!(normalizer.normalize("TaylorSwiftVEVO"), "TaylorSwiftVEVO");
        assert_eq!(normalizer.normalize("Taylor Swift VEVO"), "Taylor Swift");
        assert_eq!(normalizer.normalize("Song (Live)"), "Song");
    }

    #[test]
    fn test_multiple_tokens() {
        assert_eq!(
            n().normalize("Song (Live) [Remix] Official   Video"),
            "Song"
        );
    }

    #[test]
    fn test_only_tokens_yields_empty() {
        assert_eq!(n().normalize("Official Video"), "");
        assert_eq!(n().normalize("  live  "), "");
    }

    #[test]
    fn test_idempotent_on_samples() {
        let normalizer = n();
        let samples = [
            "",
            "   ",
            "Yesterday - Remastered 2009",
            "The Weeknd - Blinding Lights (Official Video)",
            "( ( live ) )",
            "live live audio",
            "- Topic -",
            "Eminem | Lose Yourself (Lyrics)",
            "4k4k",
            "[ ] () {}",
        ];
        for sample in samples {
            let once = normalizer.normalize(sample);
            let twice = normalizer.normalize(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
        }
    }

    /// Inputs where removing one token exposes another.
    const NESTED: &[(&str, &str)] = &[
        ("livelive", ""),
        ("vevVEVOo", ""),
        ("((live))", ""),
        ("liliveve", ""),
        ("remremixix", ""),
        ("offofficial videoicial video", ""),
        ("4k4k4k", ""),
        ("Top(live)ic", ""),
        ("[(vevo)]", ""),
        ("live - - live", ""),
        ("Song VEVOvevo", "Song"),
        ("EminemVEVO - Topic", "Eminem"),
    ];

    #[test]
    fn test_nested_tokens_fully_removed() {
        let normalizer = n();
        for (input, expected) in NESTED {
            let once = normalizer.normalize(input);
            assert_eq!(once, *expected, "wrong output for {:?}", input);

            let lower = once.to_lowercase();
            for token in NOISE_TOKENS {
                assert!(!lower.contains(token), "{:?} left {:?} in {:?}", input, token, once);
            }
        }
    }

    #[test]
    fn test_idempotent_on_nested_tokens() {
        for normalizer in [n(), bounded()] {
            for (input, _) in NESTED {
                let once = normalizer.normalize(input);
                let twice = normalizer.normalize(&once);
                assert_eq!(once, twice, "not idempotent for {:?}", input);
            }
        }
    }

    #[test]
    fn test_nested_empty_brackets_removed() {
        assert_eq!(n().normalize("Song ( ( live ) )"), "Song");
    }

    #[test]
    fn test_custom_token_set() {
        let config = NormalizerConfig::from_csv("lyrics, hq ,,");
        assert_eq!(config.noise_tokens, vec!["lyrics", "hq"]);

        let normalizer = Normalizer::new(&config).unwrap();
        assert_eq!(normalizer.normalize("Lose Yourself (Lyrics) HQ"), "Lose Yourself");
        // Built-in tokens are no longer removed
        assert_eq!(normalizer.normalize("Song live"), "Song live");
    }

    #[test]
    fn test_empty_token_set_only_trims() {
        let normalizer = Normalizer::new(&NormalizerConfig {
            noise_tokens: vec![],
            word_boundary: false,
        })
        .unwrap();
        assert_eq!(normalizer.normalize("  Song Live  "), "Song Live");
    }

    #[test]
    fn test_tokens_with_regex_metacharacters() {
        let config = NormalizerConfig {
            noise_tokens: vec!["feat.".to_string()],
            word_boundary: false,
        };
        let normalizer = Normalizer::new(&config).unwrap();
        assert_eq!(normalizer.normalize("Song featX"), "Song featX");
        assert_eq!(normalizer.normalize("Song feat. Drake"), "Song Drake");
    }

    #[test]
    fn test_normalize_query_fields_independent() {
        let q = n().normalize_query("Yesterday (Remastered)", "The Beatles - Topic");
        assert_eq!(q.track, "Yesterday");
        assert_eq!(q.artist, "The Beatles");
    }
}
