//! The home page: category filter, featured post, and a "show more" grid.

use serde::{Deserialize, Serialize};

use crate::content::{ContentError, ContentSource, ImageUrls};
use crate::model::{Category, Post};
use crate::page::{category_filter, CardView, FilterEntry};
use crate::seo::Seo;

pub const INITIAL_VISIBLE: usize = 9;
pub const PAGE_STEP: usize = 6;
pub const SKELETON_CARDS: usize = 6;
const MAX_STEPS: usize = 1000;

/// Query string of the listing route.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ListingParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shown: Option<usize>,
}

impl ListingParams {
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// How many posts of the fetched list are on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    visible: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            visible: INITIAL_VISIBLE,
        }
    }
}

impl Pagination {
    /// Rounds a requested count up to a reachable window size.
    pub fn from_shown(shown: Option<usize>) -> Self {
        let shown = shown.unwrap_or(INITIAL_VISIBLE);
        let steps = shown
            .saturating_sub(INITIAL_VISIBLE)
            .div_ceil(PAGE_STEP)
            .min(MAX_STEPS);
        Pagination {
            visible: INITIAL_VISIBLE + steps * PAGE_STEP,
        }
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn show_more(&mut self) {
        self.visible += PAGE_STEP;
    }

    pub fn reset(&mut self) {
        *self = Pagination::default();
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.visible < total
    }

    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.visible.min(items.len())]
    }
}

#[derive(Debug, Default, Clone)]
pub struct ListingData {
    pub posts: Vec<Post>,
    pub categories: Vec<Category>,
    pub featured: Vec<Post>,
}

/// The three reads behind the listing, issued together.
pub async fn fetch_listing(
    source: &dyn ContentSource,
    category: Option<&str>,
) -> Result<ListingData, ContentError> {
    let posts = async {
        match category {
            Some(slug) => source.posts_by_category(slug).await,
            None => source.all_posts().await,
        }
    };

    let (posts, categories, featured) = futures_util::try_join!(
        posts,
        source.all_categories(),
        source.featured_posts()
    )?;

    Ok(ListingData {
        posts,
        categories,
        featured,
    })
}

#[derive(Debug, Clone)]
pub enum ListingState {
    Loading,
    Ready(ListingData),
}

#[derive(Debug)]
pub struct ListingController {
    category: Option<String>,
    pagination: Pagination,
    state: ListingState,
}

impl ListingController {
    pub fn new(category: Option<&str>) -> Self {
        ListingController {
            category: category.map(str::to_string),
            pagination: Pagination::default(),
            state: ListingState::Loading,
        }
    }

    pub fn from_params(params: &ListingParams) -> Self {
        ListingController {
            pagination: Pagination::from_shown(params.shown),
            ..ListingController::new(params.category())
        }
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    /// Switching category starts over: back to the first window, data
    /// reloaded. Returns whether anything changed.
    pub fn select_category(&mut self, category: Option<&str>) -> bool {
        if self.category.as_deref() == category {
            return false;
        }
        self.category = category.map(str::to_string);
        self.pagination.reset();
        self.state = ListingState::Loading;
        true
    }

    pub fn show_more(&mut self) {
        self.pagination.show_more();
    }

    /// Any failed read leaves the page empty.
    pub async fn load(&mut self, source: &dyn ContentSource) {
        self.state = ListingState::Loading;
        let data = match fetch_listing(source, self.category()).await {
            Ok(data) => data,
            Err(err) => {
                tracing::error!(%err, category = ?self.category, "could not load listing");
                ListingData::default()
            }
        };
        self.state = ListingState::Ready(data);
    }

    fn selected_category(&self) -> Option<&Category> {
        let ListingState::Ready(data) = &self.state else {
            return None;
        };
        let slug = self.category()?;
        data.categories
            .iter()
            .find(|category| category.slug.current == slug)
    }

    pub fn seo(&self, url: String) -> Seo {
        let selected = self.selected_category();
        Seo {
            title: selected.map(|c| format!("{} Articles", c.title)),
            description: selected.map(|c| {
                format!(
                    "Browse our {} articles and insights.",
                    c.title.to_lowercase()
                )
            }),
            url: Some(url),
            ..Seo::default()
        }
    }

    /// Where the current listing lives, without the pagination window.
    pub fn canonical_path(&self) -> String {
        listing_path(&ListingParams {
            category: self.category.clone(),
            shown: None,
        })
    }

    pub fn show_more_url(&self) -> String {
        listing_path(&ListingParams {
            category: self.category.clone(),
            shown: Some(self.pagination.visible() + PAGE_STEP),
        })
    }

    pub fn view(&self, images: &ImageUrls) -> ListingView {
        let ListingState::Ready(data) = &self.state else {
            return ListingView {
                status: ListingStatus::Loading,
                filter: category_filter(&[], self.category()),
                skeletons: SKELETON_CARDS,
                ..ListingView::default()
            };
        };

        let featured = if self.category.is_none() {
            data.featured
                .first()
                .map(|post| CardView::new(post, images, true))
        } else {
            None
        };

        if data.posts.is_empty() {
            let message = if self.category.is_some() {
                "No posts found in this category."
            } else {
                "No posts found."
            };
            return ListingView {
                status: ListingStatus::Empty,
                filter: category_filter(&data.categories, self.category()),
                featured,
                empty_message: Some(message.to_string()),
                ..ListingView::default()
            };
        }

        ListingView {
            status: ListingStatus::Ready,
            filter: category_filter(&data.categories, self.category()),
            featured,
            cards: self
                .pagination
                .window(&data.posts)
                .iter()
                .map(|post| CardView::new(post, images, false))
                .collect(),
            show_more_url: self
                .pagination
                .has_more(data.posts.len())
                .then(|| self.show_more_url()),
            ..ListingView::default()
        }
    }
}

/// Path and query of a listing page, without the site's base path.
pub(crate) fn listing_path(params: &ListingParams) -> String {
    match serde_urlencoded::to_string(params) {
        Ok(query) if query.is_empty() => "/".to_string(),
        Ok(query) => format!("/?{}", query),
        Err(err) => {
            tracing::warn!(%err, "could not encode listing params");
            "/".to_string()
        }
    }
}

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Loading,
    Empty,
    Ready,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct ListingView {
    pub status: ListingStatus,
    pub filter: Vec<FilterEntry>,
    pub featured: Option<CardView>,
    pub cards: Vec<CardView>,
    pub show_more_url: Option<String>,
    pub empty_message: Option<String>,
    pub skeletons: usize,
}
