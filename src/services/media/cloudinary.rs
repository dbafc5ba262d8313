use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::MediaSettings;

use super::{MediaError, MediaStore, UploadedImage, MEDIA_FOLDER};

pub struct CloudinaryMediaStore {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

impl CloudinaryMediaStore {
    pub fn new(client: reqwest::Client, settings: &MediaSettings) -> Self {
        Self {
            client,
            cloud_name: settings.cloud_name.clone(),
            api_key: settings.api_key.clone(),
            api_secret: settings.api_secret.clone(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{}",
            self.cloud_name, action
        )
    }

    /// SHA-256 over the sorted parameter string plus the API secret, hex
    /// encoded, per the host's signed-request scheme.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by_key(|(name, _)| *name);
        let joined = sorted
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(joined.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn timestamp() -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            .to_string()
    }
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload_image(&self, data_uri: &str) -> Result<UploadedImage, MediaError> {
        let timestamp = Self::timestamp();
        let signature = self.sign(&[("folder", MEDIA_FOLDER), ("timestamp", &timestamp)]);

        let form = [
            ("file", data_uri),
            ("folder", MEDIA_FOLDER),
            ("timestamp", &timestamp),
            ("api_key", &self.api_key),
            ("signature", &signature),
        ];

        let response = self
            .client
            .post(self.endpoint("upload"))
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MediaError::Rejected(detail));
        }

        let body: UploadResponse = response.json().await?;
        Ok(UploadedImage {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn delete_image(&self, public_id: &str) -> Result<(), MediaError> {
        let timestamp = Self::timestamp();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", &timestamp)]);

        let form = [
            ("public_id", public_id),
            ("timestamp", &timestamp),
            ("api_key", &self.api_key),
            ("signature", &signature),
        ];

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MediaError::Rejected(detail));
        }

        Ok(())
    }
}
