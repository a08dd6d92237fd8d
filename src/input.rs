//! Input-file parsing: one card identifier per line.

use crate::models::CardEntry;
use std::io::{self, BufRead};

/// Reads card identifiers from `reader`, one per line. Everything after a
/// `#` is a comment; blank lines are skipped. Duplicate lines are kept,
/// one entry per copy wanted.
pub fn parse_cards<R: BufRead>(reader: R) -> io::Result<Vec<CardEntry>> {
    let mut cards = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let card = line.split('#').next().unwrap_or("").trim();
        if card.is_empty() {
            continue;
        }
        cards.push(CardEntry::new(card));
    }
    Ok(cards)
}
