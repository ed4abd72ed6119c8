/// Delivery URL derivation and image download
///
/// Every resource is addressed by composing the account, version,
/// identifier and format into the host's upload template. Thumbnails
/// insert a transformation segment (scale to width, automatic quality,
/// automatic format) into the same template.

use tracing::debug;

use super::FetchError;
use crate::config::GalleryConfig;

/// Full-resolution URL for a resource
pub fn full_url(config: &GalleryConfig, public_id: &str, version: Option<u64>, format: &str) -> String {
    compose(config, None, public_id, version, format)
}

/// Thumbnail URL for a resource, scaled to `config.thumbnail_width`
pub fn thumbnail_url(
    config: &GalleryConfig,
    public_id: &str,
    version: Option<u64>,
    format: &str,
) -> String {
    let transformation = format!("w_{},q_auto,f_auto", config.thumbnail_width);
    compose(config, Some(&transformation), public_id, version, format)
}

fn compose(
    config: &GalleryConfig,
    transformation: Option<&str>,
    public_id: &str,
    version: Option<u64>,
    format: &str,
) -> String {
    let mut url = format!("{}/{}/image/upload/", config.host_base, config.cloud_name);
    if let Some(transformation) = transformation {
        url.push_str(transformation);
        url.push('/');
    }
    if let Some(version) = version {
        url.push_str(&format!("v{}/", version));
    }
    url.push_str(public_id);
    if !format.is_empty() {
        url.push('.');
        url.push_str(format);
    }
    url
}

/// Download the encoded bytes of an image
///
/// Decoding is left to the renderer; this only moves bytes.
pub async fn fetch_image(client: reqwest::Client, url: String) -> Result<Vec<u8>, FetchError> {
    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await?;
    debug!(%url, size = bytes.len(), "downloaded image");
    Ok(bytes.to_vec())
}
