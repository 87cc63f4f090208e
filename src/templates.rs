//! Page templates, compiled into the binary.

use std::collections::HashMap;

use serde_json::Value;
use tera::Tera;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("partials/card.html", include_str!("../templates/partials/card.html")),
    ("partials/toc.html", include_str!("../templates/partials/toc.html")),
    ("partials/related.html", include_str!("../templates/partials/related.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("post.html", include_str!("../templates/post.html")),
];

/// `base_path` is the prefix the site is mounted under. Templates pass every
/// in-site link through the `site_path` filter to pick it up.
pub fn load(base_path: &str) -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())?;
    tera.set_escape_fn(escape_html);
    tera.register_filter("site_path", site_path(base_path));
    Ok(tera)
}

fn site_path(base_path: &str) -> impl tera::Filter {
    let base = base_path.trim_end_matches('/').to_string();
    move |value: &Value, _: &HashMap<String, Value>| {
        let path = tera::try_get_value!("site_path", "value", String, value);
        Ok(Value::String(format!("{}{}", base, path)))
    }
}

/// Tera's default escaper also rewrites `/`, which mangles every URL.
fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::ImageUrls;
    use crate::listing::ListingController;
    use crate::page::{Chrome, Layout};
    use crate::post::PostController;
    use crate::seo::{Head, HeadView};

    fn render<T: serde::Serialize>(template: &str, page: T) -> String {
        render_under("", template, page)
    }

    fn render_under<T: serde::Serialize>(base_path: &str, template: &str, page: T) -> String {
        let site = SiteConfig::default();
        let layout = Layout {
            head: HeadView::from(&Head::new(&site.name)),
            chrome: Chrome::new(&site),
            page,
        };
        let context = tera::Context::from_serialize(&layout).unwrap();
        load(base_path).unwrap().render(template, &context).unwrap()
    }

    fn images() -> ImageUrls {
        ImageUrls::new(url::Url::parse("https://cdn.example").unwrap(), "p", "d")
    }

    #[test]
    fn urls_survive_escaping() {
        assert_eq!(escape_html("/post/a?b=1&c=2"), "/post/a?b=1&amp;c=2");
        assert_eq!(escape_html(r#"<a href="x">'"#), "&lt;a href=&quot;x&quot;&gt;&#x27;");
    }

    #[test]
    fn all_templates_compile() {
        let tera = load("").unwrap();
        let names: Vec<&str> = tera.get_template_names().collect();
        assert!(names.contains(&"index.html"));
        assert!(names.contains(&"post.html"));
    }

    #[test]
    fn listing_skeleton_while_loading() {
        let html = render("index.html", ListingController::new(None).view(&images()));
        assert_eq!(html.matches("card-skeleton").count(), 6);
        assert!(html.contains("All Posts"));
        assert!(html.contains("<title>SessionContact Blog</title>"));
    }

    #[test]
    fn post_skeleton_while_loading() {
        let html = render("post.html", PostController::new("any").view(&images()));
        assert!(html.contains("post-skeleton"));
        assert!(!html.contains("Return to blog"));
    }

    #[test]
    fn footer_lists_category_shortcuts() {
        let html = render("index.html", ListingController::new(None).view(&images()));
        assert!(html.contains(r#"href="/?category=ai-automation""#));
        assert!(html.contains("AI &amp; Automation"));
    }

    #[test]
    fn links_carry_the_base_path() {
        let html = render_under("/blog/", "index.html", ListingController::new(None).view(&images()));
        assert!(html.contains(r#"href="/blog/static/site.css""#));
        assert!(html.contains(r#"<script src="/blog/static/search.js" defer></script>"#));
        assert!(html.contains(r#"data-endpoint="/blog/search""#));
        assert!(html.contains(r#"data-base="/blog""#));
        assert!(html.contains(r#"href="/blog/?category=ai-automation""#));
        assert!(!html.contains(r#"href="/""#));

        let html = render_under("/blog", "post.html", PostController::new("any").view(&images()));
        assert!(html.contains(r#"<a class="brand" href="/blog/">"#));
    }
}
