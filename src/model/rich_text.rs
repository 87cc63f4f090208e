use serde::{Deserialize, Deserializer};

use super::ImageAsset;

/// A flat list of typed blocks. Deserialization never fails: anything that
/// isn't a list is an empty document, and entries that don't parse become
/// [`Block::Unknown`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichText(pub Vec<Block>);

impl RichText {
    pub fn blocks(&self) -> &[Block] {
        &self.0
    }
}

impl<'de> Deserialize<'de> for RichText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let serde_json::Value::Array(items) = value else {
            return Ok(RichText::default());
        };

        Ok(RichText(
            items
                .into_iter()
                .map(|item| Block::deserialize(item).unwrap_or(Block::Unknown))
                .collect(),
        ))
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "_type")]
pub enum Block {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(rename = "image")]
    Image(ImageBlock),
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TextBlock {
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    #[serde(default)]
    pub style: BlockStyle,
    #[serde(default)]
    pub children: Vec<Span>,
    #[serde(rename = "markDefs", default)]
    pub mark_defs: Vec<MarkDef>,
    #[serde(rename = "listItem", default)]
    pub list_item: Option<ListKind>,
    #[serde(default)]
    pub level: Option<u32>,
}

impl TextBlock {
    pub fn paragraph(text: &str) -> Self {
        TextBlock::styled(BlockStyle::Normal, text)
    }

    pub fn styled(style: BlockStyle, text: &str) -> Self {
        TextBlock {
            style,
            children: vec![Span::plain(text)],
            ..TextBlock::default()
        }
    }

    /// Span text concatenated with no separator.
    pub fn text(&self) -> String {
        self.children.iter().map(|span| span.text.as_str()).collect()
    }

    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|def| def.key == key)
    }
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlockStyle {
    #[default]
    Normal,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Blockquote,
    #[serde(other)]
    Other,
}

impl BlockStyle {
    pub fn heading_level(self) -> Option<u8> {
        match self {
            BlockStyle::H1 => Some(1),
            BlockStyle::H2 => Some(2),
            BlockStyle::H3 => Some(3),
            BlockStyle::H4 => Some(4),
            BlockStyle::H5 => Some(5),
            BlockStyle::H6 => Some(6),
            _ => None,
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Span {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub marks: Vec<String>,
}

impl Span {
    pub fn plain(text: &str) -> Self {
        Span {
            text: text.to_string(),
            marks: Vec::new(),
        }
    }

    pub fn marked(text: &str, marks: &[&str]) -> Self {
        Span {
            text: text.to_string(),
            marks: marks.iter().map(|mark| mark.to_string()).collect(),
        }
    }
}

/// Annotation referenced from a span's marks by key, e.g. a link.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Bullet,
    Number,
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ImageBlock {
    #[serde(default)]
    pub asset: Option<ImageAsset>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_entries_survive() {
        let body: RichText = serde_json::from_value(serde_json::json!([
            { "_type": "block", "style": "h2", "children": [{ "_type": "span", "text": "Intro" }] },
            { "_type": "youtube", "url": "https://example.com/v" },
            { "_type": "block", "children": "not a list" },
            { "_type": "image", "asset": { "_ref": "image-a-10x10-png" }, "caption": "Chart" },
            42
        ]))
        .unwrap();

        let blocks = body.blocks();
        assert_eq!(blocks.len(), 5);
        assert!(matches!(&blocks[0], Block::Text(b) if b.style == BlockStyle::H2 && b.text() == "Intro"));
        assert_eq!(blocks[1], Block::Unknown);
        assert_eq!(blocks[2], Block::Unknown);
        assert!(matches!(&blocks[3], Block::Image(i) if i.caption.as_deref() == Some("Chart")));
        assert_eq!(blocks[4], Block::Unknown);
    }

    #[test]
    fn non_list_body_is_empty() {
        let body: RichText = serde_json::from_value(serde_json::json!({ "oops": true })).unwrap();
        assert!(body.blocks().is_empty());
    }

    #[test]
    fn unrecognized_style_is_other() {
        let block: TextBlock = serde_json::from_value(serde_json::json!({
            "style": "callout",
            "children": [{ "text": "a" }, { "text": "b", "marks": ["strong"] }]
        }))
        .unwrap();
        assert_eq!(block.style, BlockStyle::Other);
        assert_eq!(block.text(), "ab");
    }
}
