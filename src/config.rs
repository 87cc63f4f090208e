use serde::{de::Visitor, Deserialize, Serialize};
use std::{
    net::SocketAddr,
    ops::Deref,
    path::{Path, PathBuf},
};
use url::Url;

pub const DEFAULT_DATASET: &str = "production";
pub const DEFAULT_API_VERSION: &str = "2024-01-01";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("content.project_id is required (or set SANITY_PROJECT_ID)")]
    MissingProjectId,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ContentConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub timeout_secs: Option<u64>,
    pub image_cdn: Url,
    /// Replaces `https://<project>.api[cdn].sanity.io/`, e.g. for a proxy.
    pub api_host: Option<Url>,
    /// Serve from an exported dataset instead of the query API.
    pub snapshot: Option<ValidPath>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        ContentConfig {
            project_id: String::new(),
            dataset: DEFAULT_DATASET.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            use_cdn: true,
            timeout_secs: None,
            image_cdn: Url::parse(crate::content::image::DEFAULT_CDN)
                .expect("default image cdn is a valid url"),
            api_host: None,
            snapshot: None,
        }
    }
}

impl ContentConfig {
    pub fn query_endpoint(&self) -> Result<Url, url::ParseError> {
        let host = match &self.api_host {
            Some(host) => host.clone(),
            None => {
                let api = if self.use_cdn { "apicdn" } else { "api" };
                Url::parse(&format!("https://{}.{}.sanity.io/", self.project_id, api))?
            }
        };

        host.join(&format!(
            "v{}/data/query/{}",
            self.api_version.trim_start_matches('v'),
            self.dataset
        ))
    }

    /// `SANITY_PROJECT_ID` and `SANITY_DATASET` win over the file. An unset
    /// or empty dataset falls back to `production`.
    pub fn apply_env(&mut self, project_id: Option<String>, dataset: Option<String>) {
        if let Some(project_id) = project_id.filter(|id| !id.trim().is_empty()) {
            self.project_id = project_id;
        }
        if let Some(dataset) = dataset.filter(|ds| !ds.trim().is_empty()) {
            self.dataset = dataset;
        }
        if self.dataset.trim().is_empty() {
            self.dataset = DEFAULT_DATASET.to_string();
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct NetConfig {
    /// Public origin, used for canonical and Open Graph URLs.
    pub proto_host: Url,
    #[serde(default)]
    pub base_path: String,
    pub bind: SocketAddr,
}

impl NetConfig {
    pub fn public_url(&self, path_and_query: &str) -> String {
        let base = self.base_path.trim_end_matches('/');
        let origin = self.proto_host.as_str().trim_end_matches('/');
        format!("{}{}{}", origin, base, path_and_query)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FooterCategory {
    pub title: String,
    pub slug: String,
}

impl FooterCategory {
    fn new(title: &str, slug: &str) -> Self {
        FooterCategory {
            title: title.to_string(),
            slug: slug.to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub description: String,
    pub image: String,
    pub product_url: String,
    pub demo_url: String,
    /// Category shortcuts listed in the footer.
    pub footer_categories: Vec<FooterCategory>,
    pub static_dir: Option<ValidPath>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            name: "SessionContact Blog".to_string(),
            description: "Expert insights on customer experience, contact center operations, \
                          and AI-powered communication strategies."
                .to_string(),
            image: "https://sessioncontact.com/og-image.jpg".to_string(),
            product_url: "https://sessioncontact.com".to_string(),
            demo_url: "https://sessioncontact.com/demo".to_string(),
            footer_categories: vec![
                FooterCategory::new("Customer Experience", "customer-experience"),
                FooterCategory::new("AI & Automation", "ai-automation"),
                FooterCategory::new("Contact Center", "contact-center"),
                FooterCategory::new("Omnichannel", "omnichannel"),
            ],
            static_dir: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub net: NetConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml(&text)?;
        config.content.apply_env(
            std::env::var("SANITY_PROJECT_ID").ok(),
            std::env::var("SANITY_DATASET").ok(),
        );
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content.project_id.trim().is_empty() && self.content.snapshot.is_none() {
            return Err(ConfigError::MissingProjectId);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ValidPath(PathBuf);

impl<'de> Deserialize<'de> for ValidPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ValidPathVisitor;
        impl Visitor<'_> for ValidPathVisitor {
            type Value = ValidPath;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "an existing path")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ValidPath(
                    PathBuf::from(v).canonicalize().map_err(E::custom)?,
                ))
            }
        }

        deserializer.deserialize_str(ValidPathVisitor)
    }
}

impl Deref for ValidPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        self.0.as_path()
    }
}
