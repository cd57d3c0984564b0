//! Prompt template and response parsing shared by every extraction backend.

use once_cell::sync::Lazy;
use regex::Regex;

use tunebridge_core::defaults::EXTRACTION_PROMPT;
use tunebridge_core::ExtractionResult;

/// `Song: <song>, Artist: <artist>`; the song capture stops at the first
/// comma, the artist capture takes the rest of the line.
static SONG_ARTIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Song:\s*(.*?),\s*Artist:\s*(.*)").expect("song/artist pattern compiles")
});

/// Build the extraction prompt for a raw title.
pub fn extraction_prompt(title: &str) -> String {
    EXTRACTION_PROMPT.replace("{title}", title)
}

/// Parse a model response into song and artist.
///
/// No match yields an empty result, which callers treat as extraction
/// failure rather than an error.
pub fn parse_song_artist(response: &str) -> ExtractionResult {
    match SONG_ARTIST_RE.captures(response.trim()) {
        Some(caps) => ExtractionResult::new(
            caps.get(1).map_or("", |m| m.as_str()).trim(),
            caps.get(2).map_or("", |m| m.as_str()).trim(),
        ),
        None => ExtractionResult::default(),
    }
}
