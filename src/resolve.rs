//! Resolves card identifiers to downloaded image files.
//!
//! An identifier is either a direct image URL, a spoiler page URL, or a
//! plain card name that has to be located through a web search first.

use crate::fetch::Fetcher;
use crate::matching::url_best_match;
use crate::models::{url_path_basename, CardEntry, ResolvedImage};
use crate::search::{CardSearcher, SEARCH_SITE};
use scraper::{Html, Selector};
use std::path::PathBuf;

pub struct CardResolver {
    fetcher: Fetcher,
    searcher: CardSearcher,
    threshold: f64,
}

impl CardResolver {
    pub fn new(fetcher: Fetcher, searcher: CardSearcher, threshold: f64) -> Self {
        Self {
            fetcher,
            searcher,
            threshold,
        }
    }

    /// Resolves one identifier to a local image file. `None` means the
    /// card could not be found; the cause has already been reported.
    pub fn resolve(&mut self, entry: &CardEntry) -> Option<PathBuf> {
        if let Some(cached) = self.fetcher.cache().find(&entry.filename) {
            return Some(cached);
        }

        let image_url = if entry.card.starts_with("http") {
            log::debug!("Checking {}", entry.card);
            if entry.card.ends_with(".html") {
                self.image_url_from_html(&entry.card, &entry.filename)?
            } else {
                entry.card.clone()
            }
        } else {
            log::debug!("Searching {} for \"{}\"...", SEARCH_SITE, entry.card);
            let page_url = self
                .searcher
                .search(&self.fetcher, &entry.card, &entry.filename)?;
            self.image_url_from_html(&page_url, &entry.filename)?
        };

        let image_filename = url_path_basename(&image_url);
        match self.fetcher.download(&image_url, &image_filename, "") {
            Ok(path) => Some(path),
            Err(e) => {
                log::error!("{}", e);
                None
            }
        }
    }

    /// Derives the card image URL from a spoiler page, trying in order:
    /// the Open Graph meta tag, the best-matching `<img>` source, and
    /// finally a guessed `.jpg` next to the page.
    fn image_url_from_html(&self, html_url: &str, filename: &str) -> Option<String> {
        let cache_name = format!("{}_html.html", filename);
        let text = match self.fetcher.download_text(html_url, "", &cache_name) {
            Ok(text) => text,
            Err(e) => {
                log::error!("{}", e);
                return None;
            }
        };
        let doc = Html::parse_document(&text);
        let page_dir = html_url.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

        if let Some(image_url) = og_image_url(&doc) {
            if image_url.starts_with("http") {
                log::debug!("    Found image url in meta tag: {}", image_url);
                return Some(image_url);
            }
            log::debug!("    Found relative image url in meta tag: {}", image_url);
            return Some(format!("{}/{}", page_dir, image_url));
        }

        log::debug!("    Didn't find image url in meta tag, searching html...");
        if let Some(image_url) = best_matching_img(&doc, filename, self.threshold) {
            return Some(image_url);
        }

        let guessed = guessed_image_url(page_dir, filename);
        log::debug!("    Didn't find image url in html, guessing: {}", guessed);
        Some(guessed)
    }
}

/// Open Graph `og:image` meta content, if present.
fn og_image_url(doc: &Html) -> Option<String> {
    let meta = Selector::parse("meta").ok()?;
    doc.select(&meta)
        .filter(|element| element.value().attr("property") == Some("og:image"))
        .filter_map(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}

/// Best fuzzy match among the page's `<img>` sources.
fn best_matching_img(doc: &Html, filename: &str, threshold: f64) -> Option<String> {
    let img = Selector::parse("img").ok()?;
    let srcs: Vec<String> = doc
        .select(&img)
        .filter_map(|element| element.value().attr("src"))
        .map(|src| src.trim().to_string())
        .filter(|src| !src.is_empty())
        .collect();
    url_best_match(filename, srcs, threshold)
}

/// Assumes a `.jpg` named after the card sits next to the page.
fn guessed_image_url(page_dir: &str, filename: &str) -> String {
    format!("{}/{}.jpg", page_dir, filename)
}

/// Resolves every entry and decodes the downloaded files. Failures are
/// reported per identifier and skipped; the batch always continues.
pub fn resolve_all(resolver: &mut CardResolver, entries: &[CardEntry]) -> Vec<ResolvedImage> {
    let mut images = Vec::new();
    for entry in entries {
        match resolver.resolve(entry) {
            Some(path) => match image::open(&path) {
                Ok(decoded) => images.push(ResolvedImage {
                    image: decoded.to_rgb8(),
                    path,
                    card: entry.card.clone(),
                    filename: entry.filename.clone(),
                }),
                Err(e) => {
                    log::error!("Failed to decode {}: {}", path.display(), e);
                    println!("Could not find image for \"{}\"", entry.card);
                }
            },
            None => println!("Could not find image for \"{}\"", entry.card),
        }
    }
    images
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
