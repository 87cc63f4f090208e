use pulldown_cmark::{CowStr, Event, HeadingLevel, LinkType, Tag, TagEnd};

use crate::content::ImageUrls;
use crate::model::rich_text::{Block, BlockStyle, ImageBlock, ListKind, TextBlock};
use crate::page::Html;
use crate::text::anchor_id;

pub const BODY_IMAGE_WIDTH: u32 = 800;

struct OpenList {
    kind: ListKind,
    item_open: bool,
}

/// Renders a post body. Headings h1-h3 get the same anchor ids that
/// [`crate::text::extract_headings`] produces.
pub fn render_body(blocks: &[Block], images: &ImageUrls) -> Html {
    let mut events = Vec::new();
    let mut lists = Vec::new();

    for block in blocks {
        match block {
            Block::Text(text) if text.list_item.is_some() => {
                list_item(&mut events, &mut lists, text);
            }
            Block::Text(text) => {
                close_lists(&mut events, &mut lists, 0);
                text_block(&mut events, text);
            }
            Block::Image(image) => {
                close_lists(&mut events, &mut lists, 0);
                image_block(&mut events, image, images);
            }
            Block::Unknown => {}
        }
    }
    close_lists(&mut events, &mut lists, 0);

    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    Html(html)
}

fn heading_level(level: u8) -> HeadingLevel {
    match level {
        1 => HeadingLevel::H1,
        2 => HeadingLevel::H2,
        3 => HeadingLevel::H3,
        4 => HeadingLevel::H4,
        5 => HeadingLevel::H5,
        _ => HeadingLevel::H6,
    }
}

fn text_block(events: &mut Vec<Event<'static>>, block: &TextBlock) {
    if let Some(depth) = block.style.heading_level() {
        let level = heading_level(depth);
        let id = (depth <= 3)
            .then(|| anchor_id(&block.text()))
            .filter(|id| !id.is_empty())
            .map(CowStr::from);

        events.push(Event::Start(Tag::Heading {
            level,
            id,
            classes: Vec::new(),
            attrs: Vec::new(),
        }));
        inline(events, block);
        events.push(Event::End(TagEnd::Heading(level)));
        return;
    }

    let quoted = block.style == BlockStyle::Blockquote;
    if quoted {
        events.push(Event::Html("<blockquote>\n".into()));
    }
    events.push(Event::Start(Tag::Paragraph));
    inline(events, block);
    events.push(Event::End(TagEnd::Paragraph));
    if quoted {
        events.push(Event::Html("</blockquote>\n".into()));
    }
}

fn list_item(events: &mut Vec<Event<'static>>, lists: &mut Vec<OpenList>, block: &TextBlock) {
    let kind = block.list_item.unwrap_or(ListKind::Bullet);
    let level = block.level.unwrap_or(1).max(1) as usize;

    close_lists(events, lists, level);

    if lists.len() == level && lists.last().map(|list| list.kind) != Some(kind) {
        close_lists(events, lists, level - 1);
    }

    if lists.len() == level {
        if let Some(list) = lists.last_mut().filter(|list| list.item_open) {
            events.push(Event::End(TagEnd::Item));
            list.item_open = false;
        }
    }

    while lists.len() < level {
        // a nested list has to sit inside an item of its parent
        if let Some(parent) = lists.last_mut().filter(|list| !list.item_open) {
            events.push(Event::Start(Tag::Item));
            parent.item_open = true;
        }
        let start = (kind == ListKind::Number).then_some(1);
        events.push(Event::Start(Tag::List(start)));
        lists.push(OpenList {
            kind,
            item_open: false,
        });
    }

    events.push(Event::Start(Tag::Item));
    inline(events, block);
    if let Some(list) = lists.last_mut() {
        list.item_open = true;
    }
}

/// Closes open lists until at most `depth` remain.
fn close_lists(events: &mut Vec<Event<'static>>, lists: &mut Vec<OpenList>, depth: usize) {
    while lists.len() > depth {
        let Some(list) = lists.pop() else { break };
        if list.item_open {
            events.push(Event::End(TagEnd::Item));
        }
        events.push(Event::End(TagEnd::List(list.kind == ListKind::Number)));
    }
}

fn safe_href(href: &str) -> bool {
    let href = href.trim_start();
    ["http://", "https://", "mailto:", "/", "#"]
        .iter()
        .any(|prefix| href.starts_with(prefix))
}

fn inline(events: &mut Vec<Event<'static>>, block: &TextBlock) {
    for span in &block.children {
        if span.text.is_empty() {
            continue;
        }

        let mut closers = Vec::new();
        let mut code = false;

        // annotations wrap decorators
        for def in span.marks.iter().filter_map(|mark| block.mark_def(mark)) {
            let Some(href) = def.href.as_deref().filter(|href| def.kind == "link" && safe_href(href))
            else {
                continue;
            };
            events.push(Event::Start(Tag::Link {
                link_type: LinkType::Inline,
                dest_url: href.to_string().into(),
                title: CowStr::Borrowed(""),
                id: CowStr::Borrowed(""),
            }));
            closers.push(Event::End(TagEnd::Link));
        }

        for mark in span.marks.iter().filter(|mark| block.mark_def(mark).is_none()) {
            match mark.as_str() {
                "strong" => {
                    events.push(Event::Start(Tag::Strong));
                    closers.push(Event::End(TagEnd::Strong));
                }
                "em" => {
                    events.push(Event::Start(Tag::Emphasis));
                    closers.push(Event::End(TagEnd::Emphasis));
                }
                "strike-through" => {
                    events.push(Event::Start(Tag::Strikethrough));
                    closers.push(Event::End(TagEnd::Strikethrough));
                }
                "underline" => {
                    events.push(Event::InlineHtml("<u>".into()));
                    closers.push(Event::InlineHtml("</u>".into()));
                }
                "code" => code = true,
                _ => {}
            }
        }

        for (i, line) in span.text.split('\n').enumerate() {
            if i > 0 {
                events.push(Event::HardBreak);
            }
            if line.is_empty() {
                continue;
            }
            if code {
                events.push(Event::Code(line.to_string().into()));
            } else {
                events.push(Event::Text(line.to_string().into()));
            }
        }

        events.extend(closers.into_iter().rev());
    }
}

fn image_block(events: &mut Vec<Event<'static>>, image: &ImageBlock, images: &ImageUrls) {
    let Some(src) = images.resolve(image.asset.as_ref(), Some(BODY_IMAGE_WIDTH), None) else {
        return;
    };

    events.push(Event::Html("<figure>\n".into()));
    events.push(Event::Start(Tag::Image {
        link_type: LinkType::Inline,
        dest_url: src.into(),
        title: CowStr::Borrowed(""),
        id: CowStr::Borrowed(""),
    }));
    if let Some(alt) = image.alt.as_deref().filter(|alt| !alt.is_empty()) {
        events.push(Event::Text(alt.to_string().into()));
    }
    events.push(Event::End(TagEnd::Image));
    events.push(Event::Html("\n".into()));

    if let Some(caption) = image.caption.as_deref().filter(|c| !c.trim().is_empty()) {
        events.push(Event::Html("<figcaption>".into()));
        events.push(Event::Text(caption.to_string().into()));
        events.push(Event::Html("</figcaption>\n".into()));
    }
    events.push(Event::Html("</figure>\n".into()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rich_text::{MarkDef, Span};
    use crate::model::ImageAsset;

    fn images() -> ImageUrls {
        ImageUrls::new(
            url::Url::parse("https://cdn.sanity.io").unwrap(),
            "proj",
            "production",
        )
    }

    fn render(blocks: &[Block]) -> String {
        render_body(blocks, &images()).0
    }

    fn item(kind: ListKind, level: u32, text: &str) -> Block {
        Block::Text(TextBlock {
            list_item: Some(kind),
            level: Some(level),
            ..TextBlock::paragraph(text)
        })
    }

    #[test]
    fn paragraphs_and_headings() {
        let html = render(&[
            Block::Text(TextBlock::styled(BlockStyle::H2, "AI & Automation!")),
            Block::Text(TextBlock::paragraph("Fast <replies>")),
            Block::Text(TextBlock::styled(BlockStyle::H4, "Aside")),
        ]);
        assert_eq!(
            html,
            "<h2 id=\"ai-automation\">AI &amp; Automation!</h2>\n\
             <p>Fast &lt;replies&gt;</p>\n\
             <h4>Aside</h4>\n"
        );
    }

    #[test]
    fn marks_and_links() {
        let block = TextBlock {
            children: vec![
                Span::plain("Read "),
                Span::marked("the guide", &["strong", "k1"]),
                Span::marked("now", &["em", "underline"]),
                Span::marked("x", &["k2"]),
            ],
            mark_defs: vec![
                MarkDef {
                    key: "k1".into(),
                    kind: "link".into(),
                    href: Some("https://example.com/guide".into()),
                },
                MarkDef {
                    key: "k2".into(),
                    kind: "link".into(),
                    href: Some("javascript:alert(1)".into()),
                },
            ],
            ..TextBlock::default()
        };
        let html = render(&[Block::Text(block)]);
        assert_eq!(
            html,
            "<p>Read <a href=\"https://example.com/guide\"><strong>the guide</strong></a>\
             <em><u>now</u></em>x</p>\n"
        );
    }

    #[test]
    fn consecutive_items_share_a_list() {
        let html = render(&[
            item(ListKind::Bullet, 1, "one"),
            item(ListKind::Bullet, 1, "two"),
            item(ListKind::Bullet, 2, "nested"),
            item(ListKind::Number, 1, "first"),
            Block::Text(TextBlock::paragraph("after")),
        ]);
        assert_eq!(
            html,
            "<ul>\n<li>one</li>\n<li>two\n<ul>\n<li>nested</li>\n</ul>\n</li>\n</ul>\n\
             <ol>\n<li>first</li>\n</ol>\n\
             <p>after</p>\n"
        );
    }

    #[test]
    fn deep_first_item_is_wrapped() {
        let html = render(&[item(ListKind::Bullet, 2, "deep"), item(ListKind::Bullet, 1, "top")]);
        assert_eq!(
            html,
            "<ul>\n<li>\n<ul>\n<li>deep</li>\n</ul>\n</li>\n<li>top</li>\n</ul>\n"
        );
    }

    #[test]
    fn images_become_figures() {
        let html = render(&[
            Block::Image(ImageBlock {
                asset: Some(ImageAsset::from_ref("image-abc-1600x900-png")),
                alt: Some("A \"chart\"".into()),
                caption: Some("Q4 results".into()),
            }),
            Block::Image(ImageBlock::default()),
            Block::Unknown,
        ]);
        assert_eq!(
            html,
            "<figure>\n<img src=\"https://cdn.sanity.io/images/proj/production/abc-1600x900.png?w=800\" \
             alt=\"A &quot;chart&quot;\" />\n\
             <figcaption>Q4 results</figcaption>\n</figure>\n"
        );
    }

    #[test]
    fn blockquote_and_line_breaks() {
        let html = render(&[Block::Text(TextBlock::styled(
            BlockStyle::Blockquote,
            "line one\nline two",
        ))]);
        assert_eq!(
            html,
            "<blockquote>\n<p>line one<br />\nline two</p>\n</blockquote>\n"
        );
    }
}
