//! Optional cloud media store for raw uploads.
//!
//! Uploads go to a hosted media service via an unsigned preset. When the
//! cloud name or preset is missing the store reports unconfigured and the
//! handlers skip the upload entirely; nothing in the request path depends on
//! a stored copy existing.

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use crate::config::Settings;

#[derive(Debug, Clone, Deserialize)]
pub struct StoredObject {
    pub public_id: String,
    pub secure_url: String,
}

#[derive(Clone)]
pub struct MediaStore {
    client: Client,
    cloud_name: Option<String>,
    upload_preset: Option<String>,
    enabled: bool,
}

impl MediaStore {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        let configured =
            settings.media_cloud_name.is_some() && settings.media_upload_preset.is_some();
        if settings.save_uploads_to_cloud && !configured {
            tracing::warn!("SAVE_UPLOADS_TO_CLOUD is set but media credentials are missing; uploads stay local");
        }

        Ok(Self {
            client,
            cloud_name: settings.media_cloud_name.clone(),
            upload_preset: settings.media_upload_preset.clone(),
            enabled: settings.save_uploads_to_cloud,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.cloud_name.is_some() && self.upload_preset.is_some()
    }

    /// Whether uploads should actually be forwarded to the cloud.
    pub fn should_upload(&self) -> bool {
        self.enabled && self.is_configured()
    }

    /// Upload a raw file buffer into the given folder under a unique name.
    pub async fn upload(&self, bytes: Vec<u8>, folder: &str, filename: &str) -> Result<StoredObject> {
        let cloud_name = self
            .cloud_name
            .as_deref()
            .context("media store not configured")?;
        let preset = self
            .upload_preset
            .as_deref()
            .context("media store not configured")?;

        let url = format!("https://api.cloudinary.com/v1_1/{cloud_name}/raw/upload");
        let unique_name = format!("{}-{}", Uuid::new_v4(), filename);

        let form = Form::new()
            .text("upload_preset", preset.to_string())
            .text("folder", folder.to_string())
            .part("file", Part::bytes(bytes).file_name(unique_name));

        let stored: StoredObject = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("media upload request failed")?
            .error_for_status()
            .context("media service rejected the upload")?
            .json()
            .await
            .context("invalid media service response")?;

        tracing::debug!(public_id = %stored.public_id, "file uploaded to media store");
        Ok(stored)
    }
}
