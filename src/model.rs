use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

pub mod rich_text;

pub use rich_text::{Block, RichText};

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Slug {
    pub current: String,
}

impl Slug {
    pub fn new(current: impl Into<String>) -> Self {
        Slug {
            current: current.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.current
    }
}

/// Either a direct URL or an opaque asset id that only the image CDN can
/// resolve. Dereferenced assets carry both.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageAsset {
    #[serde(rename = "_ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ImageAsset {
    pub fn from_url(url: impl Into<String>) -> Self {
        ImageAsset {
            reference: None,
            url: Some(url.into()),
        }
    }

    pub fn from_ref(reference: impl Into<String>) -> Self {
        ImageAsset {
            reference: Some(reference.into()),
            url: None,
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MainImage {
    #[serde(default)]
    pub asset: Option<ImageAsset>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AuthorImage {
    #[serde(default)]
    pub asset: Option<ImageAsset>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub image: Option<AuthorImage>,
}

impl Author {
    pub fn image_asset(&self) -> Option<&ImageAsset> {
        self.image.as_ref().and_then(|image| image.asset.as_ref())
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: Slug,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: Slug,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(rename = "mainImage", default)]
    pub main_image: Option<MainImage>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default, deserialize_with = "dangling_refs")]
    pub categories: Vec<Category>,
    #[serde(rename = "publishedAt", with = "time::serde::iso8601")]
    pub published_at: OffsetDateTime,
    #[serde(default)]
    pub body: Option<RichText>,
    #[serde(rename = "readingTime", default)]
    pub reading_time: Option<u32>,
    /// Only present in exported snapshots; queries filter on it instead.
    #[serde(rename = "isFeatured", default)]
    pub featured: bool,
}

impl Post {
    pub fn main_image_asset(&self) -> Option<&ImageAsset> {
        self.main_image.as_ref().and_then(|image| image.asset.as_ref())
    }

    pub fn main_image_alt(&self) -> &str {
        self.main_image
            .as_ref()
            .and_then(|image| image.alt.as_deref())
            .unwrap_or(&self.title)
    }

    pub fn category_slugs(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|category| category.slug.current.clone())
            .collect()
    }
}

// a missing list comes back as null, and a reference to a deleted
// document dereferences to null inside the list
fn dangling_refs<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_from_query_result() {
        let post: Post = serde_json::from_value(serde_json::json!({
            "_id": "post-1",
            "title": "How AI is Transforming Customer Service",
            "slug": { "current": "ai-transforming-customer-service" },
            "excerpt": "Discover how AI is changing support.",
            "mainImage": { "asset": { "_ref": "image-abc-1200x630-jpg", "url": null }, "alt": "dashboard" },
            "author": { "_id": "author-1", "name": "James Wilson", "title": "Head of CX" },
            "categories": [
                { "_id": "c1", "title": "AI & Automation", "slug": { "current": "ai-automation" } },
                null,
                { "_id": "c2", "title": "Omnichannel", "slug": { "current": "omnichannel" } }
            ],
            "publishedAt": "2024-12-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(post.slug.as_str(), "ai-transforming-customer-service");
        assert_eq!(post.category_slugs(), vec!["ai-automation", "omnichannel"]);
        assert_eq!(post.main_image_alt(), "dashboard");
        assert_eq!(
            post.main_image_asset().and_then(|a| a.reference.as_deref()),
            Some("image-abc-1200x630-jpg")
        );
        assert_eq!(post.published_at.year(), 2024);
        assert!(post.body.is_none());
    }

    #[test]
    fn null_categories_are_empty() {
        let post: Post = serde_json::from_value(serde_json::json!({
            "_id": "post-2",
            "title": "Untitled",
            "slug": { "current": "untitled" },
            "categories": null,
            "publishedAt": "2024-11-20T09:30:00.000Z"
        }))
        .unwrap();

        assert!(post.categories.is_empty());
        assert_eq!(post.main_image_alt(), "Untitled");
        assert!(post.author.is_none());
    }
}
