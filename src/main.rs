use std::{path::PathBuf, sync::Arc};

use pressroom::{
    config::Config,
    content::{ContentSource, ImageUrls, MemorySource, SanityClient},
    routes::{self, AppState},
};
use tracing_subscriber::EnvFilter;

#[derive(thiserror::Error, Debug)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] pressroom::config::ConfigError),

    #[error(transparent)]
    Content(#[from] pressroom::content::ContentError),

    #[error(transparent)]
    Template(#[from] tera::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("pressroom.toml"));
    let config = Config::load(&path)?;
    tracing::debug!(?config, "loaded config");

    let source: Arc<dyn ContentSource> = match &config.content.snapshot {
        Some(snapshot) => {
            let images = ImageUrls::new(
                config.content.image_cdn.clone(),
                &config.content.project_id,
                &config.content.dataset,
            );
            Arc::new(MemorySource::load(snapshot, images)?)
        }
        None => {
            let client = SanityClient::new(&config.content)?;
            tracing::info!(endpoint = %client.endpoint(), "querying content store");
            Arc::new(client)
        }
    };

    let bind = config.net.bind;
    let app = routes::router(AppState::new(source, config)?);

    tracing::info!("Listening on http://{}", bind);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
