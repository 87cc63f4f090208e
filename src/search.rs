//! Header search: a debounced query box over [`ContentSource::search`].
//!
//! Every keystroke bumps a generation counter. The debounce timer and the
//! request it starts both carry the generation they were created for, and
//! anything that finishes after a newer keystroke is dropped.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::content::ContentSource;
use crate::model::Post;
use crate::page::post_url;

pub const DEBOUNCE: Duration = Duration::from_millis(300);
const BADGES: usize = 2;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub slug: String,
    pub url: String,
    pub excerpt: Option<String>,
    pub categories: Vec<String>,
}

impl From<&Post> for SearchHit {
    fn from(post: &Post) -> Self {
        SearchHit {
            title: post.title.clone(),
            slug: post.slug.current.clone(),
            url: post_url(&post.slug.current),
            excerpt: post.excerpt.clone().filter(|e| !e.is_empty()),
            categories: post
                .categories
                .iter()
                .take(BADGES)
                .map(|category| category.title.clone())
                .collect(),
        }
    }
}

/// Runs one search and degrades failures to no results.
pub async fn search_hits(source: &dyn ContentSource, term: &str) -> Vec<SearchHit> {
    match source.search(term).await {
        Ok(posts) => posts.iter().map(SearchHit::from).collect(),
        Err(err) => {
            tracing::error!(%err, term, "search failed");
            Vec::new()
        }
    }
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct SearchState {
    pub open: bool,
    pub query: String,
    pub results: Vec<SearchHit>,
    pub loading: bool,
}

pub struct SearchBox {
    source: Arc<dyn ContentSource>,
    state: Arc<Mutex<SearchState>>,
    generation: Arc<AtomicU64>,
    timer: Option<JoinHandle<()>>,
}

impl SearchBox {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        SearchBox {
            source,
            state: Arc::default(),
            generation: Arc::default(),
            timer: None,
        }
    }

    fn lock(state: &Mutex<SearchState>) -> MutexGuard<'_, SearchState> {
        state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SearchState {
        Self::lock(&self.state).clone()
    }

    pub fn toggle(&mut self) {
        let mut state = Self::lock(&self.state);
        state.open = !state.open;
    }

    pub fn close_on_outside_click(&mut self, inside: bool) {
        if !inside {
            Self::lock(&self.state).open = false;
        }
    }

    /// Invalidates everything in flight and returns the new generation.
    fn supersede(&mut self) -> u64 {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn input(&mut self, text: &str) {
        let generation = self.supersede();
        {
            let mut state = Self::lock(&self.state);
            state.query = text.to_string();
            if text.trim().is_empty() {
                state.results.clear();
                state.loading = false;
                return;
            }
        }

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let term = text.to_string();

        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }

            Self::lock(&state).loading = true;
            // the request outlives the timer, later keystrokes only make
            // its answer stale
            tokio::spawn(async move {
                tracing::debug!(term, generation, "searching");
                let hits = search_hits(source.as_ref(), &term).await;

                if current.load(Ordering::SeqCst) != generation {
                    tracing::debug!(term, generation, "discarding stale search results");
                    return;
                }
                let mut state = Self::lock(&state);
                state.results = hits;
                state.loading = false;
            });
        }));
    }

    pub fn clear(&mut self) {
        self.input("");
    }

    /// Following a result closes the box and forgets the query.
    pub fn select_result(&mut self) {
        self.supersede();
        let mut state = Self::lock(&self.state);
        state.open = false;
        state.query.clear();
        state.results.clear();
        state.loading = false;
    }
}

impl Drop for SearchBox {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
