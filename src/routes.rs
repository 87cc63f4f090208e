use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tera::Tera;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::compat::MyQuery;
use crate::config::Config;
use crate::content::ContentSource;
use crate::error::{AppError, AppResult};
use crate::listing::{ListingController, ListingParams};
use crate::page::{post_url, Chrome, Layout};
use crate::post::PostController;
use crate::search::{search_hits, SearchHit};
use crate::seo::{Head, HeadView, Seo};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ContentSource>,
    pub templates: Arc<Tera>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(source: Arc<dyn ContentSource>, config: Config) -> Result<Self, tera::Error> {
        Ok(AppState {
            source,
            templates: Arc::new(crate::templates::load(&config.net.base_path)?),
            config: Arc::new(config),
        })
    }

    fn render<T: Serialize>(&self, template: &str, seo: &Seo, page: T) -> AppResult<Html<String>> {
        let site = &self.config.site;
        let mut head = Head::new(&site.name);
        // the head is built per response, so it is never reverted
        let _applied = seo.apply(site, &mut head);

        let layout = Layout {
            head: HeadView::from(&head),
            chrome: Chrome::new(site),
            page,
        };
        let context = tera::Context::from_serialize(&layout)?;
        Ok(Html(self.templates.render(template, &context)?))
    }
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(index))
        .route("/post/:slug", get(post))
        .route("/search", get(search))
        .route("/healthz", get(healthz))
        .fallback(not_found);

    if let Some(dir) = &state.config.site.static_dir {
        app = app.nest_service("/static", ServeDir::new(&**dir));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn index(
    State(state): State<AppState>,
    MyQuery(params): MyQuery<ListingParams>,
) -> AppResult<Html<String>> {
    let mut listing = ListingController::from_params(&params);
    listing.load(state.source.as_ref()).await;

    let seo = listing.seo(state.config.net.public_url(&listing.canonical_path()));
    state.render("index.html", &seo, listing.view(state.source.images()))
}

async fn post(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Response> {
    let mut controller = PostController::new(&slug);
    controller.load(state.source.as_ref()).await;

    let images = state.source.images();
    let seo = controller.seo(state.config.net.public_url(&post_url(&slug)), images);
    let html = state.render("post.html", &seo, controller.view(images))?;
    Ok((controller.status(), html).into_response())
}

#[derive(Deserialize, Debug)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

async fn search(
    State(state): State<AppState>,
    MyQuery(params): MyQuery<SearchParams>,
) -> Json<Vec<SearchHit>> {
    Json(search_hits(state.source.as_ref(), &params.q).await)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn not_found() -> AppError {
    AppError::NotFound
}
