use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

use super::{query, ContentError, ContentSource, ImageUrls, Query};
use crate::config::ContentConfig;
use crate::model::{Category, Post};

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

/// Talks to the hosted query endpoint over HTTPS. One attempt per read.
#[derive(Clone, Debug)]
pub struct SanityClient {
    http: reqwest::Client,
    endpoint: Url,
    images: ImageUrls,
}

impl SanityClient {
    pub fn new(config: &ContentConfig) -> Result<Self, ContentError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(SanityClient {
            http: builder.build()?,
            endpoint: config.query_endpoint()?,
            images: ImageUrls::new(config.image_cdn.clone(), &config.project_id, &config.dataset),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The query string sent for `query`: the GROQ text plus one
    /// JSON-encoded `$name` pair per bound parameter.
    pub fn request_url(&self, query: &Query) -> Result<Url, ContentError> {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &query.groq());
            for (name, value) in query.params() {
                pairs.append_pair(&format!("${name}"), &serde_json::to_string(&value)?);
            }
        }
        Ok(url)
    }

    #[tracing::instrument(name = "content_fetch", skip(self, query), fields(query = query.name()))]
    async fn fetch<T: DeserializeOwned>(&self, query: &Query) -> Result<T, ContentError> {
        let url = self.request_url(query)?;
        tracing::debug!(%url, "dispatching query");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(ContentError::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let Envelope { result } = serde_json::from_slice::<Envelope<T>>(&bytes)?;
        Ok(result)
    }

    async fn fetch_list<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>, ContentError> {
        let list: Option<Vec<T>> = self.fetch(query).await?;
        Ok(list.unwrap_or_default())
    }
}

#[async_trait]
impl ContentSource for SanityClient {
    async fn all_posts(&self) -> Result<Vec<Post>, ContentError> {
        self.fetch_list(&Query::AllPosts).await
    }

    async fn featured_posts(&self) -> Result<Vec<Post>, ContentError> {
        let mut posts: Vec<Post> = self.fetch_list(&Query::FeaturedPosts).await?;
        posts.truncate(query::FEATURED_LIMIT);
        Ok(posts)
    }

    async fn posts_by_category(&self, category_slug: &str) -> Result<Vec<Post>, ContentError> {
        self.fetch_list(&Query::PostsByCategory(category_slug.to_string()))
            .await
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, ContentError> {
        self.fetch(&Query::PostBySlug(slug.to_string())).await
    }

    async fn all_categories(&self) -> Result<Vec<Category>, ContentError> {
        self.fetch_list(&Query::AllCategories).await
    }

    async fn search(&self, term: &str) -> Result<Vec<Post>, ContentError> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut posts: Vec<Post> = self.fetch_list(&Query::Search(term.to_string())).await?;
        posts.truncate(query::SEARCH_LIMIT);
        Ok(posts)
    }

    async fn related_posts(
        &self,
        slug: &str,
        category_slugs: &[String],
    ) -> Result<Vec<Post>, ContentError> {
        if category_slugs.is_empty() {
            return Ok(Vec::new());
        }
        let mut posts: Vec<Post> = self
            .fetch_list(&Query::RelatedPosts {
                slug: slug.to_string(),
                categories: category_slugs.to_vec(),
            })
            .await?;
        posts.truncate(query::RELATED_LIMIT);
        Ok(posts)
    }

    fn images(&self) -> &ImageUrls {
        &self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ContentConfig {
        ContentConfig {
            project_id: "n3s7nj4t".into(),
            dataset: "production".into(),
            ..ContentConfig::default()
        }
    }

    #[test]
    fn endpoint_uses_cdn_host_by_default() {
        let client = SanityClient::new(&config()).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://n3s7nj4t.apicdn.sanity.io/v2024-01-01/data/query/production"
        );
    }

    #[test]
    fn endpoint_without_cdn() {
        let client = SanityClient::new(&ContentConfig {
            use_cdn: false,
            ..config()
        })
        .unwrap();
        assert_eq!(client.endpoint().host_str(), Some("n3s7nj4t.api.sanity.io"));
    }

    #[test]
    fn parameters_are_json_encoded() {
        let client = SanityClient::new(&config()).unwrap();
        let url = client
            .request_url(&Query::PostBySlug("ai-in-2024".into()))
            .unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "query");
        assert!(pairs[0].1.contains("slug.current == $slug"));
        assert_eq!(pairs[1], ("$slug".to_string(), "\"ai-in-2024\"".to_string()));
    }

    #[test]
    fn envelope_with_null_result() {
        let Envelope { result } =
            serde_json::from_str::<Envelope<Option<Post>>>(r#"{"ms":3,"query":"*","result":null}"#)
                .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn blank_search_skips_the_network() {
        // unroutable endpoint, so any request would fail
        let client = SanityClient::new(&ContentConfig {
            api_host: Some(Url::parse("http://127.0.0.1:9/").unwrap()),
            ..config()
        })
        .unwrap();
        assert!(client.search("   ").await.unwrap().is_empty());
        assert!(client.related_posts("a", &[]).await.unwrap().is_empty());
    }

    /// A client pointed at a local server that answers every request with
    /// `status` and `body`.
    async fn answering(status: axum::http::StatusCode, body: &'static str) -> SanityClient {
        let app: axum::Router = axum::Router::new().fallback(move || async move { (status, body) });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        SanityClient::new(&ContentConfig {
            api_host: Some(Url::parse(&format!("http://{addr}/")).unwrap()),
            ..config()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn null_list_is_empty() {
        let client = answering(axum::http::StatusCode::OK, r#"{"ms":1,"result":null}"#).await;
        assert!(client.all_categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn result_envelope_is_unwrapped() {
        let client = answering(
            axum::http::StatusCode::OK,
            r#"{"query":"*","result":[{
                "_id": "1",
                "title": "Hello",
                "slug": { "current": "hello" },
                "categories": [null],
                "publishedAt": "2024-01-01T00:00:00Z"
            }]}"#,
        )
        .await;

        let posts = client.all_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug.current, "hello");
        assert!(posts[0].categories.is_empty());
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let client = answering(
            axum::http::StatusCode::BAD_REQUEST,
            r#"{"error":{"description":"param $slug referenced, but not provided"}}"#,
        )
        .await;

        match client.post_by_slug("hello").await {
            Err(ContentError::Status { status, body }) => {
                assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
                assert!(body.contains("not provided"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_body_is_a_decode_error() {
        let client = answering(axum::http::StatusCode::OK, "<html>oops</html>").await;
        assert!(matches!(
            client.all_posts().await,
            Err(ContentError::Decode(_))
        ));
    }
}
