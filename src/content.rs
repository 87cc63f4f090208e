//! Read access to the hosted content store.

use async_trait::async_trait;

use crate::model::{Category, Post};

pub mod client;
pub mod image;
pub mod memory;
pub mod query;

pub use client::SanityClient;
pub use image::ImageUrls;
pub use memory::MemorySource;
pub use query::Query;

#[derive(thiserror::Error, Debug)]
pub enum ContentError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content store answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("could not decode query result: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid query url: {0}")]
    Url(#[from] url::ParseError),

    #[error("could not read snapshot: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the pages need from the content store. Lists of posts come
/// back newest first.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn all_posts(&self) -> Result<Vec<Post>, ContentError>;

    /// At most [`query::FEATURED_LIMIT`] posts flagged as featured.
    async fn featured_posts(&self) -> Result<Vec<Post>, ContentError>;

    async fn posts_by_category(&self, category_slug: &str) -> Result<Vec<Post>, ContentError>;

    /// A single post including its body and the author's bio.
    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, ContentError>;

    /// Ordered by title.
    async fn all_categories(&self) -> Result<Vec<Category>, ContentError>;

    /// Title or excerpt match, at most [`query::SEARCH_LIMIT`] posts. A blank
    /// term matches nothing.
    async fn search(&self, term: &str) -> Result<Vec<Post>, ContentError>;

    /// Up to [`query::RELATED_LIMIT`] other posts sharing a category.
    async fn related_posts(
        &self,
        slug: &str,
        category_slugs: &[String],
    ) -> Result<Vec<Post>, ContentError>;

    fn images(&self) -> &ImageUrls;
}
