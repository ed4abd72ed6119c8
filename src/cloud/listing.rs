/// Listing of all resources carrying the gallery tag
///
/// The host exposes a public JSON document per tag. It has no server-side
/// cursor, so the whole tagged set is retrieved in one request and
/// partitioned locally by the controller.

use serde::Deserialize;
use std::collections::HashSet;
use tracing::{info, warn};

use super::delivery;
use super::FetchError;
use crate::config::GalleryConfig;
use crate::state::data::ImageResource;

/// Top-level listing document
#[derive(Deserialize, Debug)]
struct ListingResponse {
    /// Absent when the tag has no resources
    #[serde(default)]
    resources: Vec<ResourceDescriptor>,
}

/// One resource as described by the host
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    pub public_id: String,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl ResourceDescriptor {
    fn into_resource(self, config: &GalleryConfig) -> ImageResource {
        let url = delivery::full_url(config, &self.public_id, self.version, &self.format);
        let thumbnail_url =
            delivery::thumbnail_url(config, &self.public_id, self.version, &self.format);

        ImageResource {
            public_id: self.public_id,
            version: self.version,
            format: self.format,
            width: self.width,
            height: self.height,
            url,
            thumbnail_url,
        }
    }
}

/// URL of the "list resources by tag" document
pub fn listing_url(config: &GalleryConfig) -> String {
    format!(
        "{}/{}/image/list/{}.json",
        config.host_base, config.cloud_name, config.tag
    )
}

/// Decode a listing body into resources, preserving the host's order.
///
/// Identifiers are unique within a listing; if the host ever repeats one,
/// only the first occurrence is kept.
pub fn parse_listing(config: &GalleryConfig, body: &[u8]) -> Result<Vec<ImageResource>, FetchError> {
    let response: ListingResponse = serde_json::from_slice(body)?;

    let mut seen = HashSet::with_capacity(response.resources.len());
    let mut resources = Vec::with_capacity(response.resources.len());
    for descriptor in response.resources {
        if !seen.insert(descriptor.public_id.clone()) {
            warn!(public_id = %descriptor.public_id, "duplicate resource in listing, skipping");
            continue;
        }
        resources.push(descriptor.into_resource(config));
    }

    Ok(resources)
}

/// Retrieve the full listing for the configured tag
pub async fn fetch_listing(
    client: reqwest::Client,
    config: GalleryConfig,
) -> Result<Vec<ImageResource>, FetchError> {
    let url = listing_url(&config);
    info!(%url, "requesting listing");

    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        warn!(%url, status = status.as_u16(), "listing request failed");
        return Err(FetchError::Status {
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    let resources = parse_listing(&config, &body)?;
    info!(count = resources.len(), tag = %config.tag, "listing received");
    Ok(resources)
}
