pub mod cloudinary;
pub mod mock_media;

use async_trait::async_trait;

pub const MEDIA_FOLDER: &str = "products";

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media host request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("media host rejected the request: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

/// Third-party image host, specified only at this boundary. Product rows
/// store the returned URL; deletion works back from it.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// `data_uri` is the base64 payload the client sent inline.
    async fn upload_image(&self, data_uri: &str) -> Result<UploadedImage, MediaError>;
    async fn delete_image(&self, public_id: &str) -> Result<(), MediaError>;
}

/// Recovers `products/<stem>` from a stored image URL so the host-side copy
/// can be destroyed alongside the product row.
pub fn public_id_from_url(url: &str) -> Option<String> {
    let file = url.rsplit('/').next()?;
    let stem = file.split('.').next()?;
    if stem.is_empty() {
        return None;
    }
    Some(format!("{}/{}", MEDIA_FOLDER, stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_public_id_from_hosted_url() {
        let url = "https://res.example.com/demo/image/upload/v12/products/abc123.png";
        assert_eq!(public_id_from_url(url).as_deref(), Some("products/abc123"));
    }

    #[test]
    fn empty_url_yields_none() {
        assert_eq!(public_id_from_url(""), None);
    }
}
