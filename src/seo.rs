//! Page metadata: document title, description, Open Graph and Twitter
//! card tags, canonical link.

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::SiteConfig;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MetaAttr {
    Name,
    Property,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct MetaTag {
    pub attr: MetaAttr,
    pub key: String,
    pub content: String,
}

/// The `<head>` of a page. Meta tags are keyed by attribute and name, so a
/// key holds at most one tag.
#[derive(Clone, Debug, Default)]
pub struct Head {
    title: String,
    meta: IndexMap<(MetaAttr, String), String>,
    canonical: Option<String>,
}

impl Head {
    pub fn new(title: impl Into<String>) -> Self {
        Head {
            title: title.into(),
            ..Head::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn canonical(&self) -> Option<&str> {
        self.canonical.as_deref()
    }

    pub fn meta(&self, attr: MetaAttr, key: &str) -> Option<&str> {
        self.meta
            .get(&(attr, key.to_string()))
            .map(String::as_str)
    }

    pub fn meta_count(&self) -> usize {
        self.meta.len()
    }

    /// Updates the tag in place when it exists, appends it otherwise.
    pub fn upsert(&mut self, attr: MetaAttr, key: &str, content: impl Into<String>) {
        self.meta.insert((attr, key.to_string()), content.into());
    }

    pub fn tags(&self) -> Vec<MetaTag> {
        self.meta
            .iter()
            .map(|((attr, key), content)| MetaTag {
                attr: *attr,
                key: key.clone(),
                content: content.clone(),
            })
            .collect()
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct HeadView {
    pub title: String,
    pub tags: Vec<MetaTag>,
    pub canonical: Option<String>,
}

impl From<&Head> for HeadView {
    fn from(head: &Head) -> Self {
        HeadView {
            title: head.title.clone(),
            tags: head.tags(),
            canonical: head.canonical.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageKind {
    #[default]
    Website,
    Article,
}

impl PageKind {
    fn as_str(self) -> &'static str {
        match self {
            PageKind::Website => "website",
            PageKind::Article => "article",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Seo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub kind: PageKind,
    pub published_at: Option<String>,
    pub author: Option<String>,
}

/// Proof that [`Seo::apply`] ran. Hand it back to restore the site title.
#[must_use]
#[derive(Debug)]
pub struct AppliedSeo {
    default_title: String,
}

impl AppliedSeo {
    pub fn revert(self, head: &mut Head) {
        head.set_title(self.default_title);
    }
}

impl Seo {
    pub fn full_title(&self, site: &SiteConfig) -> String {
        match self.title.as_deref().filter(|title| !title.is_empty()) {
            Some(title) => format!("{} | {}", title, site.name),
            None => site.name.clone(),
        }
    }

    pub fn apply(&self, site: &SiteConfig, head: &mut Head) -> AppliedSeo {
        let title = self.full_title(site);
        let description = self
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| site.description.clone());
        let image = self
            .image
            .clone()
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| site.image.clone());

        head.set_title(title.clone());

        head.upsert(MetaAttr::Name, "description", description.clone());

        head.upsert(MetaAttr::Property, "og:title", title.clone());
        head.upsert(MetaAttr::Property, "og:description", description.clone());
        head.upsert(MetaAttr::Property, "og:type", self.kind.as_str());
        head.upsert(MetaAttr::Property, "og:site_name", site.name.clone());
        if !image.is_empty() {
            head.upsert(MetaAttr::Property, "og:image", image.clone());
        }
        if let Some(url) = &self.url {
            head.upsert(MetaAttr::Property, "og:url", url.clone());
        }

        head.upsert(MetaAttr::Name, "twitter:card", "summary_large_image");
        head.upsert(MetaAttr::Name, "twitter:title", title);
        head.upsert(MetaAttr::Name, "twitter:description", description);
        if !image.is_empty() {
            head.upsert(MetaAttr::Name, "twitter:image", image);
        }

        if self.kind == PageKind::Article {
            if let Some(published_at) = &self.published_at {
                head.upsert(
                    MetaAttr::Property,
                    "article:published_time",
                    published_at.clone(),
                );
            }
            if let Some(author) = &self.author {
                head.upsert(MetaAttr::Property, "article:author", author.clone());
            }
        }

        if let Some(url) = &self.url {
            head.canonical = Some(url.clone());
        }

        AppliedSeo {
            default_title: site.name.clone(),
        }
    }
}
