use url::Url;

use crate::model::ImageAsset;

pub const DEFAULT_CDN: &str = "https://cdn.sanity.io";

/// Turns image references into displayable URLs, optionally resized by the
/// CDN.
#[derive(Clone, Debug)]
pub struct ImageUrls {
    cdn: Url,
    project_id: String,
    dataset: String,
}

impl ImageUrls {
    pub fn new(cdn: Url, project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        ImageUrls {
            cdn,
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    /// A direct URL wins over a reference. `None` when there is nothing to
    /// show.
    pub fn resolve(
        &self,
        asset: Option<&ImageAsset>,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Option<String> {
        let asset = asset?;

        if let Some(url) = asset.url.as_deref().filter(|url| !url.is_empty()) {
            return Some(url.to_string());
        }

        let reference = asset.reference.as_deref()?;
        match self.transform(reference, width, height) {
            Some(url) => Some(url.into()),
            None => {
                tracing::warn!(reference, "unresolvable image reference");
                None
            }
        }
    }

    pub fn sized(&self, asset: Option<&ImageAsset>, width: u32, height: u32) -> Option<String> {
        self.resolve(asset, Some(width), Some(height))
    }

    fn transform(&self, reference: &str, width: Option<u32>, height: Option<u32>) -> Option<Url> {
        let (id, dimensions, format) = parse_reference(reference)?;

        let mut url = self
            .cdn
            .join(&format!(
                "images/{}/{}/{}-{}.{}",
                self.project_id, self.dataset, id, dimensions, format
            ))
            .ok()?;

        if width.is_some() || height.is_some() {
            let mut query = url.query_pairs_mut();
            if let Some(width) = width {
                query.append_pair("w", &width.to_string());
            }
            if let Some(height) = height {
                query.append_pair("h", &height.to_string());
            }
        }

        Some(url)
    }
}

/// `image-<id>-<width>x<height>-<format>`
fn parse_reference(reference: &str) -> Option<(&str, &str, &str)> {
    let rest = reference.strip_prefix("image-")?;
    let (rest, format) = rest.rsplit_once('-')?;
    let (id, dimensions) = rest.rsplit_once('-')?;

    let (w, h) = dimensions.split_once('x')?;
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if id.is_empty() || format.is_empty() || !numeric(w) || !numeric(h) {
        return None;
    }

    Some((id, dimensions, format))
}
