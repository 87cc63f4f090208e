//! A single post: hero, cover, outline, body, author bio and related posts.

use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use crate::content::{ContentSource, ImageUrls};
use crate::model::Post;
use crate::page::{format_date, AuthorView, CategoryBadge, Html, RelatedView};
use crate::render::render_body;
use crate::seo::{PageKind, Seo};
use crate::text::{body_reading_time, extract_headings};
use crate::toc::TableOfContents;

const AUTHOR_AVATAR: u32 = 80;
const BIO_AVATAR: u32 = 120;
const COVER_WIDTH: u32 = 1200;
const COVER_HEIGHT: u32 = 630;

/// Slugs are looked up as given. Anything outside the RFC 3986 unreserved
/// set can't have come from a link this site rendered.
pub fn is_url_safe(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~'))
}

#[derive(Debug, Clone)]
pub enum PostState {
    Loading,
    NotFound,
    Failed,
    Ready { post: Box<Post>, related: Vec<Post> },
}

#[derive(Debug)]
pub struct PostController {
    slug: String,
    state: PostState,
}

impl PostController {
    pub fn new(slug: &str) -> Self {
        PostController {
            slug: slug.to_string(),
            state: PostState::Loading,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn state(&self) -> &PostState {
        &self.state
    }

    /// Returns whether the slug changed, in which case the post has to be
    /// loaded again.
    pub fn navigate(&mut self, slug: &str) -> bool {
        if self.slug == slug {
            return false;
        }
        self.slug = slug.to_string();
        self.state = PostState::Loading;
        true
    }

    #[tracing::instrument(skip(self, source), fields(slug = %self.slug))]
    pub async fn load(&mut self, source: &dyn ContentSource) {
        self.state = PostState::Loading;

        if !is_url_safe(&self.slug) {
            tracing::debug!("slug is not url safe");
            self.state = PostState::NotFound;
            return;
        }

        let post = match source.post_by_slug(&self.slug).await {
            Ok(Some(post)) => post,
            Ok(None) => {
                self.state = PostState::NotFound;
                return;
            }
            Err(err) => {
                tracing::error!(%err, "could not load post");
                self.state = PostState::Failed;
                return;
            }
        };

        let related = match source
            .related_posts(&post.slug.current, &post.category_slugs())
            .await
        {
            Ok(related) => related,
            Err(err) => {
                tracing::warn!(%err, "could not load related posts");
                Vec::new()
            }
        };

        self.state = PostState::Ready {
            post: Box::new(post),
            related,
        };
    }

    pub fn status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self.state {
            PostState::Loading | PostState::Ready { .. } => StatusCode::OK,
            PostState::NotFound => StatusCode::NOT_FOUND,
            PostState::Failed => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn seo(&self, url: String, images: &ImageUrls) -> Seo {
        match &self.state {
            PostState::Ready { post, .. } => Seo {
                title: Some(post.title.clone()),
                description: post.excerpt.clone(),
                image: images.sized(post.main_image_asset(), COVER_WIDTH, COVER_HEIGHT),
                url: Some(url),
                kind: PageKind::Article,
                published_at: post.published_at.format(&Rfc3339).ok(),
                author: post.author.as_ref().map(|author| author.name.clone()),
            },
            PostState::NotFound => Seo {
                title: Some("Post not found".to_string()),
                ..Seo::default()
            },
            PostState::Loading | PostState::Failed => Seo::default(),
        }
    }

    pub fn view(&self, images: &ImageUrls) -> PostPage {
        match &self.state {
            PostState::Loading => PostPage::Loading,
            PostState::NotFound => PostPage::NotFound {
                message: "Post not found".to_string(),
            },
            PostState::Failed => PostPage::Failed {
                message: "Failed to load post".to_string(),
            },
            PostState::Ready { post, related } => {
                PostPage::Ready(Box::new(PostView::new(post, related, images)))
            }
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PostPage {
    Loading,
    NotFound { message: String },
    Failed { message: String },
    Ready(Box<PostView>),
}

#[derive(Serialize, Debug)]
pub struct PostView {
    pub title: String,
    pub excerpt: Option<String>,
    pub categories: Vec<CategoryBadge>,
    pub author: Option<AuthorView>,
    pub date: String,
    pub reading_time: u32,
    pub image: Option<String>,
    pub image_alt: String,
    pub toc: Option<TableOfContents>,
    pub body: Html,
    pub related: Vec<RelatedView>,
}

impl PostView {
    pub fn new(post: &Post, related: &[Post], images: &ImageUrls) -> Self {
        let blocks = post.body.as_ref().map(|body| body.blocks()).unwrap_or(&[]);
        let toc = TableOfContents::new(extract_headings(blocks));

        PostView {
            title: post.title.clone(),
            excerpt: post.excerpt.clone().filter(|excerpt| !excerpt.is_empty()),
            categories: post.categories.iter().map(CategoryBadge::from).collect(),
            author: post
                .author
                .as_ref()
                .map(|author| AuthorView::new(author, images, AUTHOR_AVATAR, BIO_AVATAR)),
            date: format_date(post.published_at),
            reading_time: body_reading_time(post.body.as_ref()),
            image: images.sized(post.main_image_asset(), COVER_WIDTH, COVER_HEIGHT),
            image_alt: post.main_image_alt().to_string(),
            toc: toc.is_rendered().then_some(toc),
            body: render_body(blocks, images),
            related: related
                .iter()
                .map(|post| RelatedView::new(post, images))
                .collect(),
        }
    }
}
