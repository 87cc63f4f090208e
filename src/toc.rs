//! Table of contents for a post. The outline only shows up once a post has
//! at least [`MIN_HEADINGS`] headings.

use serde::Serialize;

use crate::text::Heading;

pub const MIN_HEADINGS: usize = 3;
/// Distance kept between the top of the viewport and a heading scrolled to.
pub const SCROLL_OFFSET: i32 = 100;
const HEADER_HEIGHT: f64 = 80.0;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ScrollTarget {
    pub id: String,
    pub offset: i32,
}

/// One notification from the viewport watcher.
#[derive(Clone, Debug)]
pub struct Intersection<'a> {
    pub id: &'a str,
    pub intersecting: bool,
}

/// Vertical bounds of the tracked content region, relative to the viewport.
#[derive(Clone, Copy, Debug)]
pub struct Bounds {
    pub top: f64,
    pub bottom: f64,
}

#[derive(Serialize, Clone, Debug)]
pub struct TableOfContents {
    headings: Vec<Heading>,
    active_id: Option<String>,
    expanded: bool,
    sidebar_visible: bool,
}

impl TableOfContents {
    pub fn new(headings: Vec<Heading>) -> Self {
        TableOfContents {
            headings,
            active_id: None,
            expanded: false,
            sidebar_visible: false,
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.headings.len() >= MIN_HEADINGS
    }

    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_sidebar_visible(&self) -> bool {
        self.is_rendered() && self.sidebar_visible
    }

    fn knows(&self, id: &str) -> bool {
        self.headings.iter().any(|heading| heading.id == id)
    }

    /// Applies watcher notifications in arrival order. The last
    /// intersecting heading wins.
    pub fn observe<'a>(&mut self, entries: impl IntoIterator<Item = Intersection<'a>>) {
        if !self.is_rendered() {
            return;
        }
        for entry in entries {
            if entry.intersecting && self.knows(entry.id) {
                self.active_id = Some(entry.id.to_string());
            }
        }
    }

    /// Jump to a heading from the outline. Collapses the mobile panel.
    pub fn activate(&mut self, id: &str) -> Option<ScrollTarget> {
        if !self.is_rendered() || !self.knows(id) {
            return None;
        }
        self.expanded = false;
        Some(ScrollTarget {
            id: id.to_string(),
            offset: SCROLL_OFFSET,
        })
    }

    pub fn toggle(&mut self) {
        if self.is_rendered() {
            self.expanded = !self.expanded;
        }
    }

    /// Recomputed on every scroll: the sidebar shows while the content
    /// region spans the middle of the viewport.
    pub fn on_scroll(&mut self, content: Bounds, viewport_height: f64) {
        if !self.is_rendered() {
            return;
        }
        self.sidebar_visible =
            content.top < viewport_height - 200.0 && content.bottom > HEADER_HEIGHT + 100.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(id: &str, level: u8) -> Heading {
        Heading {
            text: id.to_uppercase(),
            level,
            id: id.to_string(),
        }
    }

    fn toc(n: usize) -> TableOfContents {
        TableOfContents::new(
            ["intro", "setup", "usage", "faq"][..n]
                .iter()
                .map(|id| heading(id, 2))
                .collect(),
        )
    }

    fn seen(id: &str) -> Intersection<'_> {
        Intersection {
            id,
            intersecting: true,
        }
    }

    #[test]
    fn hidden_below_three_headings() {
        let mut toc = toc(2);
        assert!(!toc.is_rendered());

        toc.on_scroll(Bounds { top: 0.0, bottom: 2000.0 }, 900.0);
        toc.toggle();
        toc.observe([seen("intro")]);
        assert!(!toc.is_sidebar_visible());
        assert!(!toc.is_expanded());
        assert_eq!(toc.active_id(), None);
        assert_eq!(toc.activate("intro"), None);
    }

    #[test]
    fn last_intersecting_heading_wins() {
        let mut toc = toc(3);
        toc.observe([
            seen("intro"),
            Intersection { id: "setup", intersecting: false },
            seen("usage"),
            seen("not-a-heading"),
        ]);
        assert_eq!(toc.active_id(), Some("usage"));

        toc.observe([Intersection { id: "usage", intersecting: false }]);
        assert_eq!(toc.active_id(), Some("usage"));
    }

    #[test]
    fn activation_scrolls_and_collapses() {
        let mut toc = toc(4);
        toc.toggle();
        assert!(toc.is_expanded());

        assert_eq!(
            toc.activate("faq"),
            Some(ScrollTarget { id: "faq".into(), offset: 100 })
        );
        assert!(!toc.is_expanded());

        toc.toggle();
        assert_eq!(toc.activate("missing"), None);
        assert!(toc.is_expanded());
    }

    #[test]
    fn sidebar_tracks_content_region() {
        let mut toc = toc(3);
        assert!(!toc.is_sidebar_visible());

        toc.on_scroll(Bounds { top: 650.0, bottom: 3000.0 }, 900.0);
        assert!(toc.is_sidebar_visible());

        // content still below the fold
        toc.on_scroll(Bounds { top: 750.0, bottom: 3000.0 }, 900.0);
        assert!(!toc.is_sidebar_visible());

        // scrolled past the end of the content
        toc.on_scroll(Bounds { top: -2800.0, bottom: 150.0 }, 900.0);
        assert!(!toc.is_sidebar_visible());
    }
}
