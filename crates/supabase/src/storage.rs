use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderValue, CONTENT_TYPE};

use crate::client::{read_body, SupabaseClient};
use daycare_core::backend::{BlobStore, FileUpload};
use daycare_core::errors::{Error, Result};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Percent-encodes each segment of an object path, keeping the separators.
fn encode_object_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn object_path(base: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/{}/{}",
        base,
        urlencoding::encode(bucket),
        encode_object_path(path)
    )
}

fn public_object_path(base: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}/{}",
        base,
        urlencoding::encode(bucket),
        encode_object_path(path)
    )
}

/// Supabase Storage adapter.
pub struct SupabaseStorage {
    client: Arc<SupabaseClient>,
}

impl SupabaseStorage {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BlobStore for SupabaseStorage {
    async fn upload(&self, bucket: &str, path: &str, file: FileUpload) -> Result<()> {
        let url = object_path(self.client.config().base_url(), bucket, path);
        let content_type = file
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let content_type = HeaderValue::from_str(content_type)
            .map_err(|e| Error::Upload(format!("Invalid content type: {}", e)))?;
        debug!("uploading {} ({} bytes) to {}", file.file_name, file.bytes.len(), bucket);

        let response = self
            .client
            .http()
            .post(url)
            .headers(self.client.headers()?)
            .header(CONTENT_TYPE, content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(file.bytes)
            .send()
            .await
            .map_err(|e| Error::Upload(e.to_string()))?;
        read_body(response)
            .await
            .map_err(|failure| Error::Upload(failure.message))?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> Result<String> {
        Ok(public_object_path(
            self.client.config().base_url(),
            bucket,
            path,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_and_public_paths() {
        let base = "https://abc.supabase.co";
        assert_eq!(
            object_path(base, "galleryfiles", "daily-reports/c1/photo 1.jpg"),
            "https://abc.supabase.co/storage/v1/object/galleryfiles/daily-reports/c1/photo%201.jpg"
        );
        assert_eq!(
            public_object_path(base, "galleryfiles", "/daily-reports/c1/a.png"),
            "https://abc.supabase.co/storage/v1/object/public/galleryfiles/daily-reports/c1/a.png"
        );
    }
}
