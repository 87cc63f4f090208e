use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use super::{query, ContentError, ContentSource, ImageUrls};
use crate::model::{Category, Post};

/// An exported dataset: already-dereferenced posts and categories.
#[derive(Deserialize, Debug, Default)]
pub struct Snapshot {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Answers every read from memory with the same ordering and limits as
/// the hosted queries. Used for offline previews and in tests.
#[derive(Debug)]
pub struct MemorySource {
    posts: Vec<Post>,
    categories: Vec<Category>,
    images: ImageUrls,
}

impl MemorySource {
    pub fn new(snapshot: Snapshot, images: ImageUrls) -> Self {
        let Snapshot {
            mut posts,
            mut categories,
        } = snapshot;
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        categories.sort_by(|a, b| a.title.cmp(&b.title));

        MemorySource {
            posts,
            categories,
            images,
        }
    }

    pub fn load(path: &Path, images: ImageUrls) -> Result<Self, ContentError> {
        let text = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&text)?;
        tracing::info!(
            posts = snapshot.posts.len(),
            categories = snapshot.categories.len(),
            path = %path.display(),
            "loaded content snapshot"
        );
        Ok(Self::new(snapshot, images))
    }

    fn summaries<'a>(&self, posts: impl Iterator<Item = &'a Post>) -> Vec<Post> {
        posts
            .map(|post| Post {
                body: None,
                ..post.clone()
            })
            .collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn all_posts(&self) -> Result<Vec<Post>, ContentError> {
        Ok(self.summaries(self.posts.iter()))
    }

    async fn featured_posts(&self) -> Result<Vec<Post>, ContentError> {
        Ok(self.summaries(
            self.posts
                .iter()
                .filter(|post| post.featured)
                .take(query::FEATURED_LIMIT),
        ))
    }

    async fn posts_by_category(&self, category_slug: &str) -> Result<Vec<Post>, ContentError> {
        Ok(self.summaries(self.posts.iter().filter(|post| {
            post.categories
                .iter()
                .any(|category| category.slug.current == category_slug)
        })))
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, ContentError> {
        Ok(self
            .posts
            .iter()
            .find(|post| post.slug.current == slug)
            .cloned())
    }

    async fn all_categories(&self) -> Result<Vec<Category>, ContentError> {
        Ok(self.categories.clone())
    }

    async fn search(&self, term: &str) -> Result<Vec<Post>, ContentError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.summaries(
            self.posts
                .iter()
                .filter(|post| {
                    contains_ignore_case(&post.title, term)
                        || post
                            .excerpt
                            .as_deref()
                            .is_some_and(|excerpt| contains_ignore_case(excerpt, term))
                })
                .take(query::SEARCH_LIMIT),
        ))
    }

    async fn related_posts(
        &self,
        slug: &str,
        category_slugs: &[String],
    ) -> Result<Vec<Post>, ContentError> {
        Ok(self.summaries(
            self.posts
                .iter()
                .filter(|post| post.slug.current != slug)
                .filter(|post| {
                    post.categories
                        .iter()
                        .any(|category| category_slugs.contains(&category.slug.current))
                })
                .take(query::RELATED_LIMIT),
        ))
    }

    fn images(&self) -> &ImageUrls {
        &self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> MemorySource {
        let posts: Vec<Post> = (1..=8)
            .map(|day| {
                let category = if day % 2 == 0 { "omnichannel" } else { "contact-center" };
                let excerpt = if day == 3 { "All about ROUTING" } else { "" };
                let featured = day >= 4;
                serde_json::from_value(serde_json::json!({
                    "_id": format!("post-{day}"),
                    "title": format!("Post {day}"),
                    "slug": { "current": format!("post-{day}") },
                    "excerpt": excerpt,
                    "categories": [{ "_id": category, "title": category, "slug": { "current": category } }],
                    "publishedAt": format!("2024-11-{day:02}T08:00:00Z"),
                    "isFeatured": featured,
                    "body": [{ "_type": "block", "children": [{ "text": "hi" }] }]
                }))
                .unwrap()
            })
            .collect();
        let categories = serde_json::from_value(serde_json::json!([
            { "_id": "b", "title": "Omnichannel", "slug": { "current": "omnichannel" } },
            { "_id": "a", "title": "Contact Center", "slug": { "current": "contact-center" } }
        ]))
        .unwrap();

        MemorySource::new(
            Snapshot { posts, categories },
            ImageUrls::new(url::Url::parse("https://cdn.example").unwrap(), "p", "d"),
        )
    }

    fn slugs(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|post| post.slug.as_str()).collect()
    }

    #[tokio::test]
    async fn newest_first_without_bodies() {
        let posts = source().all_posts().await.unwrap();
        assert_eq!(slugs(&posts)[..3], ["post-8", "post-7", "post-6"]);
        assert!(posts.iter().all(|post| post.body.is_none()));

        let full = source().post_by_slug("post-2").await.unwrap().unwrap();
        assert!(full.body.is_some());
        assert!(source().post_by_slug("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn limits_match_hosted_queries() {
        let source = source();
        assert_eq!(slugs(&source.featured_posts().await.unwrap()), ["post-8", "post-7", "post-6"]);
        assert_eq!(
            slugs(&source.posts_by_category("omnichannel").await.unwrap()),
            ["post-8", "post-6", "post-4", "post-2"]
        );
        assert_eq!(source.search("post").await.unwrap().len(), 5);
        assert_eq!(slugs(&source.search("routing").await.unwrap()), ["post-3"]);
        assert!(source.search(" ").await.unwrap().is_empty());
        assert_eq!(
            slugs(&source.related_posts("post-8", &["omnichannel".into()]).await.unwrap()),
            ["post-6", "post-4", "post-2"]
        );

        let titles: Vec<String> = source
            .all_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, ["Contact Center", "Omnichannel"]);
    }
}
