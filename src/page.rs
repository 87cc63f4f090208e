//! View models handed to the templates.

use serde::Serialize;
use time::OffsetDateTime;

use crate::config::{FooterCategory, SiteConfig};
use crate::content::ImageUrls;
use crate::listing::{listing_path, ListingParams};
use crate::model::{Author, Category, Post};
use crate::seo::HeadView;

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct Html(pub String);

/// Default reading times for cards whose post carries no estimate.
const FEATURED_READING_TIME: u32 = 8;
const CARD_READING_TIME: u32 = 5;
const CARD_BADGES: usize = 2;

pub fn post_url(slug: &str) -> String {
    format!("/post/{}", slug)
}

pub fn category_url(slug: &str) -> String {
    listing_path(&ListingParams {
        category: Some(slug.to_string()),
        shown: None,
    })
}

/// "December 1, 2024"
pub fn format_date(date: OffsetDateTime) -> String {
    format!("{} {}, {}", date.month(), date.day(), date.year())
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CategoryBadge {
    pub title: String,
    pub slug: String,
    pub url: String,
}

impl From<&FooterCategory> for CategoryBadge {
    fn from(category: &FooterCategory) -> Self {
        CategoryBadge {
            title: category.title.clone(),
            slug: category.slug.clone(),
            url: category_url(&category.slug),
        }
    }
}

impl From<&Category> for CategoryBadge {
    fn from(category: &Category) -> Self {
        CategoryBadge {
            title: category.title.clone(),
            slug: category.slug.current.clone(),
            url: category_url(&category.slug.current),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AuthorView {
    pub name: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub bio_image: Option<String>,
}

impl AuthorView {
    pub fn new(author: &Author, images: &ImageUrls, avatar: u32, bio_avatar: u32) -> Self {
        let asset = author.image_asset();
        AuthorView {
            name: author.name.clone(),
            title: author.title.clone().filter(|t| !t.is_empty()),
            bio: author.bio.clone().filter(|b| !b.trim().is_empty()),
            image: images.sized(asset, avatar, avatar),
            bio_image: images.sized(asset, bio_avatar, bio_avatar),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CardView {
    pub title: String,
    pub url: String,
    pub excerpt: Option<String>,
    pub image: Option<String>,
    pub image_alt: String,
    pub author: Option<AuthorView>,
    pub date: String,
    pub reading_time: u32,
    pub categories: Vec<CategoryBadge>,
    pub featured: bool,
}

impl CardView {
    pub fn new(post: &Post, images: &ImageUrls, featured: bool) -> Self {
        let reading_time = post.reading_time.unwrap_or(if featured {
            FEATURED_READING_TIME
        } else {
            CARD_READING_TIME
        });

        CardView {
            title: post.title.clone(),
            url: post_url(&post.slug.current),
            excerpt: post
                .excerpt
                .clone()
                .filter(|excerpt| featured && !excerpt.is_empty()),
            image: images.sized(post.main_image_asset(), 800, 450),
            image_alt: post.main_image_alt().to_string(),
            author: post
                .author
                .as_ref()
                .map(|author| AuthorView::new(author, images, 48, 48)),
            date: format_date(post.published_at),
            reading_time,
            categories: post
                .categories
                .iter()
                .take(CARD_BADGES)
                .map(CategoryBadge::from)
                .collect(),
            featured,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RelatedView {
    pub title: String,
    pub url: String,
    pub image: Option<String>,
    pub image_alt: String,
    pub category: Option<String>,
}

impl RelatedView {
    pub fn new(post: &Post, images: &ImageUrls) -> Self {
        RelatedView {
            title: post.title.clone(),
            url: post_url(&post.slug.current),
            image: images.sized(post.main_image_asset(), 400, 225),
            image_alt: post.main_image_alt().to_string(),
            category: post.categories.first().map(|c| c.title.clone()),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct FilterEntry {
    pub label: String,
    pub url: String,
    pub selected: bool,
}

/// "All Posts" followed by one entry per category.
pub fn category_filter(categories: &[Category], selected: Option<&str>) -> Vec<FilterEntry> {
    let mut entries = vec![FilterEntry {
        label: "All Posts".to_string(),
        url: "/".to_string(),
        selected: selected.is_none(),
    }];
    entries.extend(categories.iter().map(|category| FilterEntry {
        label: category.title.clone(),
        url: category_url(&category.slug.current),
        selected: selected == Some(category.slug.current.as_str()),
    }));
    entries
}

/// Header and footer.
#[derive(Serialize, Clone, Debug)]
pub struct Chrome {
    pub name: String,
    pub product_url: String,
    pub demo_url: String,
    pub footer_categories: Vec<CategoryBadge>,
    pub year: i32,
}

impl Chrome {
    pub fn new(site: &SiteConfig) -> Self {
        Chrome {
            name: site.name.clone(),
            product_url: site.product_url.clone(),
            demo_url: site.demo_url.clone(),
            footer_categories: site
                .footer_categories
                .iter()
                .map(CategoryBadge::from)
                .collect(),
            year: OffsetDateTime::now_utc().year(),
        }
    }
}

/// Everything the base layout needs, plus the page-specific body.
#[derive(Serialize, Debug)]
pub struct Layout<T: Serialize> {
    pub head: HeadView,
    pub chrome: Chrome,
    pub page: T,
}
