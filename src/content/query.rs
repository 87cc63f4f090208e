//! GROQ for every read the site performs. Caller-supplied values (slugs,
//! search terms) are always bound as `$parameters`, never spliced into the
//! query text.

use serde_json::{Map, Value};

pub const FEATURED_LIMIT: usize = 3;
pub const SEARCH_LIMIT: usize = 5;
pub const RELATED_LIMIT: usize = 3;

const IMAGE: &str = "asset->{ _ref, url }";

fn card_projection() -> String {
    format!(
        "{{ _id, title, slug, excerpt, mainImage {{ {IMAGE}, alt }}, \
         author->{{ _id, name, title, image {{ {IMAGE} }} }}, \
         categories[]->{{ _id, title, slug }}, publishedAt, readingTime }}"
    )
}

fn full_projection() -> String {
    format!(
        "{{ _id, title, slug, excerpt, mainImage {{ {IMAGE}, alt }}, \
         author->{{ _id, name, title, bio, image {{ {IMAGE} }} }}, \
         categories[]->{{ _id, title, slug }}, publishedAt, readingTime, body }}"
    )
}

const SEARCH_PROJECTION: &str =
    "{ _id, title, slug, excerpt, publishedAt, categories[]->{ _id, title, slug } }";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
    AllPosts,
    FeaturedPosts,
    PostsByCategory(String),
    PostBySlug(String),
    AllCategories,
    Search(String),
    RelatedPosts {
        slug: String,
        categories: Vec<String>,
    },
}

impl Query {
    pub fn name(&self) -> &'static str {
        match self {
            Query::AllPosts => "all_posts",
            Query::FeaturedPosts => "featured_posts",
            Query::PostsByCategory(_) => "posts_by_category",
            Query::PostBySlug(_) => "post_by_slug",
            Query::AllCategories => "all_categories",
            Query::Search(_) => "search",
            Query::RelatedPosts { .. } => "related_posts",
        }
    }

    pub fn groq(&self) -> String {
        match self {
            Query::AllPosts => format!(
                r#"*[_type == "post"] | order(publishedAt desc) {}"#,
                card_projection()
            ),
            Query::FeaturedPosts => format!(
                r#"*[_type == "post" && isFeatured == true] | order(publishedAt desc)[0...{FEATURED_LIMIT}] {}"#,
                card_projection()
            ),
            Query::PostsByCategory(_) => format!(
                r#"*[_type == "post" && $categorySlug in categories[]->slug.current] | order(publishedAt desc) {}"#,
                card_projection()
            ),
            Query::PostBySlug(_) => format!(
                r#"*[_type == "post" && slug.current == $slug][0] {}"#,
                full_projection()
            ),
            Query::AllCategories => {
                r#"*[_type == "category"] | order(title asc) { _id, title, slug, description }"#
                    .to_string()
            }
            Query::Search(_) => format!(
                r#"*[_type == "post" && (title match $pattern || excerpt match $pattern)] | order(publishedAt desc)[0...{SEARCH_LIMIT}] {SEARCH_PROJECTION}"#
            ),
            Query::RelatedPosts { .. } => format!(
                r#"*[_type == "post" && slug.current != $slug && count((categories[]->slug.current)[@ in $categories]) > 0] | order(publishedAt desc)[0...{RELATED_LIMIT}] {}"#,
                card_projection()
            ),
        }
    }

    /// Values for the `$parameters` referenced by [`Query::groq`].
    pub fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        match self {
            Query::AllPosts | Query::FeaturedPosts | Query::AllCategories => {}
            Query::PostsByCategory(slug) => {
                params.insert("categorySlug".into(), Value::from(slug.as_str()));
            }
            Query::PostBySlug(slug) => {
                params.insert("slug".into(), Value::from(slug.as_str()));
            }
            Query::Search(term) => {
                params.insert("pattern".into(), Value::from(format!("*{}*", term.trim())));
            }
            Query::RelatedPosts { slug, categories } => {
                params.insert("slug".into(), Value::from(slug.as_str()));
                params.insert("categories".into(), Value::from(categories.clone()));
            }
        }
        params
    }
}
