//! Core data types shared across the pipeline.

use image::RgbImage;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"\W").unwrap();
}

/// One parsed input line: the raw identifier and its normalized cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardEntry {
    /// The identifier as written: a card name, a spoiler page URL, or a
    /// direct image URL.
    pub card: String,
    /// Filesystem-safe key derived from the identifier.
    pub filename: String,
}

impl CardEntry {
    pub fn new(card: &str) -> Self {
        Self {
            card: card.to_string(),
            filename: card_to_filename(card),
        }
    }
}

/// A downloaded card image ready for sheet composition.
pub struct ResolvedImage {
    pub image: RgbImage,
    pub path: PathBuf,
    pub card: String,
    pub filename: String,
}

/// Path component of a URL. Inputs that don't parse as absolute URLs
/// (relative links from search results) are treated as bare paths.
fn url_path(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => {
            // Strip any query or fragment from a relative link
            let end = url.find(['?', '#']).unwrap_or(url.len());
            url[..end].to_string()
        }
    }
}

/// Basename of a URL's path component, as used for download filenames.
pub fn url_path_basename(url: &str) -> String {
    let path = url_path(url);
    path.rsplit('/').next().unwrap_or("").to_string()
}

/// Percent-decodes a string, with `+` treated as space.
fn unquote_plus(s: &str) -> String {
    let plus = s.replace('+', " ");
    urlencoding::decode(&plus)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(plus)
}

/// Lowercases, drops non-ASCII characters and strips everything that
/// isn't a word character.
fn normalize(name: &str) -> String {
    let ascii: String = name.chars().filter(|c| c.is_ascii()).collect();
    NON_WORD.replace_all(&ascii.to_lowercase(), "").into_owned()
}

/// Normalized key for a URL: basename of the decoded path with the
/// extension stripped, then normalized like a plain card name.
pub fn url_to_filename(url: &str) -> String {
    let decoded = unquote_plus(&url_path(url));
    let base = decoded.rsplit('/').next().unwrap_or("");
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    normalize(stem)
}

/// Normalizes an identifier into a filesystem-safe cache key.
pub fn card_to_filename(card: &str) -> String {
    if card.starts_with("http") {
        url_to_filename(card)
    } else {
        normalize(card)
    }
}
