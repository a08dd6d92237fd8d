//! Search-engine rotation for locating a card's spoiler page.

use crate::fetch::Fetcher;
use crate::matching::url_best_match;
use scraper::{Html, Selector};

/// Site the card search is restricted to.
pub const SEARCH_SITE: &str = "mythicspoiler.com";

/// One search backend: a query-URL prefix and the CSS selector whose
/// `href` attributes are harvested as result links.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    pub name: &'static str,
    pub url: String,
    pub selector: String,
}

impl SearchEngine {
    pub fn new(name: &'static str, url: &str, selector: &str) -> Self {
        Self {
            name,
            url: url.to_string(),
            selector: selector.to_string(),
        }
    }
}

/// The production backends, tried in this order.
pub fn default_engines() -> Vec<SearchEngine> {
    vec![
        SearchEngine::new("ask", "http://www.ask.com/web?q=", "a"),
        SearchEngine::new("bing", "http://www.bing.com/search?q=", "a"),
        SearchEngine::new("duckduckgo", "https://duckduckgo.com/html/?q=", "a"),
        SearchEngine::new("yahoo", "https://search.yahoo.com/search?p=", "a"),
    ]
}

/// Rotor over an ordered list. The cursor persists across cycles so
/// consecutive lookups spread their load across the items instead of
/// always starting at the first one.
pub struct RoundRobin<T> {
    items: Vec<T>,
    next: usize,
}

impl<T> RoundRobin<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, next: 0 }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the current item and moves the cursor one step.
    pub fn advance(&mut self) -> &T {
        let item = &self.items[self.next];
        self.next = (self.next + 1) % self.items.len();
        item
    }
}

pub struct CardSearcher {
    engines: RoundRobin<SearchEngine>,
    threshold: f64,
}

impl CardSearcher {
    pub fn new(engines: Vec<SearchEngine>, threshold: f64) -> Self {
        Self {
            engines: RoundRobin::new(engines),
            threshold,
        }
    }

    /// Queries the backends for `card`, one full rotation at most,
    /// returning the best matching result link from the first backend
    /// that produces one.
    pub fn search(&mut self, fetcher: &Fetcher, card: &str, filename: &str) -> Option<String> {
        for _ in 0..self.engines.len() {
            let engine = self.engines.advance().clone();
            if let Some(url) = self.search_with_engine(&engine, fetcher, card, filename) {
                return Some(url);
            }
        }
        None
    }

    fn search_with_engine(
        &self,
        engine: &SearchEngine,
        fetcher: &Fetcher,
        card: &str,
        filename: &str,
    ) -> Option<String> {
        let query = format!("\"{}\" site:{}", card, SEARCH_SITE);
        let cache_name = format!("{}_{}_search.html", filename, engine.name);
        let text = match fetcher.download_text(&engine.url, &query, &cache_name) {
            Ok(text) => text,
            Err(e) => {
                log::debug!("    {} search failed: {}", engine.name, e);
                return None;
            }
        };
        let links = extract_links(&text, &engine.selector);
        url_best_match(filename, links, self.threshold)
    }
}

/// Harvests trimmed, non-empty `href` attributes under `selector`.
fn extract_links(html: &str, selector: &str) -> Vec<String> {
    let selector = match Selector::parse(selector) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };
    let doc = Html::parse_document(html);
    doc.select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
