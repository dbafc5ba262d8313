use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{MediaError, MediaStore, UploadedImage, MEDIA_FOLDER};

#[derive(Clone, Default)]
pub struct MockMediaStore {
    pub uploads: Arc<Mutex<Vec<String>>>,
    pub deletes: Arc<Mutex<Vec<String>>>,
    pub fail_uploads: bool,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn upload_image(&self, data_uri: &str) -> Result<UploadedImage, MediaError> {
        if self.fail_uploads {
            return Err(MediaError::Rejected("mock upload failure".into()));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(data_uri.to_string());
        let n = uploads.len();
        Ok(UploadedImage {
            url: format!("https://media.test/{}/mock-{}.png", MEDIA_FOLDER, n),
            public_id: format!("{}/mock-{}", MEDIA_FOLDER, n),
        })
    }

    async fn delete_image(&self, public_id: &str) -> Result<(), MediaError> {
        self.deletes.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}
