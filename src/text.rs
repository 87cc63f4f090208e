use serde::Serialize;

use crate::model::{Block, RichText};

pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    pub text: String,
    pub level: u8,
    pub id: String,
}

/// Text of every paragraph and heading block, one space between blocks.
pub fn extract_plain_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            Block::Text(text) => Some(text.text()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The h1-h3 outline of a document. Headings with the same text get the
/// same id.
pub fn extract_headings(blocks: &[Block]) -> Vec<Heading> {
    blocks
        .iter()
        .filter_map(|block| match block {
            Block::Text(text) => {
                let level = text.style.heading_level().filter(|level| *level <= 3)?;
                let text = text.text();
                Some(Heading {
                    id: anchor_id(&text),
                    text,
                    level,
                })
            }
            _ => None,
        })
        .collect()
}

/// Lowercases, collapses each run of characters outside `[a-z0-9]` to a
/// single hyphen, then trims hyphens from both ends.
pub fn anchor_id(text: &str) -> String {
    let mut id = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !id.is_empty() {
                id.push('-');
            }
            pending_hyphen = false;
            id.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    id
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes to read `text`, rounded up, never less than one.
pub fn reading_time(text: &str) -> u32 {
    let minutes = word_count(text).div_ceil(WORDS_PER_MINUTE);
    minutes.max(1) as u32
}

pub fn body_reading_time(body: Option<&RichText>) -> u32 {
    let text = body
        .map(|body| extract_plain_text(body.blocks()))
        .unwrap_or_default();
    reading_time(&text)
}
