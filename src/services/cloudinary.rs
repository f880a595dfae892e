//! Cloudinary client for the video upload and destroy endpoints.
//!
//! Signed parameters are sorted by name, joined as `k=v&k=v`, suffixed with the
//! API secret and hashed with SHA-256 or SHA-1 (`CLOUDINARY_SIGNATURE_ALGORITHM`).
//! The chosen algorithm is sent as `signature_algorithm` on every request.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::config::{CloudinaryConfig, SignatureAlgorithm};
use crate::constants::{MEDIA_FOLDER, THUMBNAIL_TRANSFORMATION, UPLOAD_TRANSFORMATION};
use crate::services::media::{MediaBackend, MediaError, MediaUpload, StoredMedia};

const API_BASE: &str = "https://api.cloudinary.com";
const DELIVERY_BASE: &str = "https://res.cloudinary.com";

#[derive(Clone)]
pub struct CloudinaryClient {
    cloud_name: String,
    api_key: String,
    api_secret: String,
    signature_algorithm: SignatureAlgorithm,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl CloudinaryClient {
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            signature_algorithm: config.signature_algorithm,
            http: Client::new(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/v1_1/{}/video/{}", API_BASE, self.cloud_name, action)
    }

    fn sign(&self, params: &[(&str, String)]) -> String {
        let payload = format!("{}{}", string_to_sign(params), self.api_secret);
        match self.signature_algorithm {
            SignatureAlgorithm::Sha1 => format!("{:x}", Sha1::digest(payload.as_bytes())),
            SignatureAlgorithm::Sha256 => format!("{:x}", Sha256::digest(payload.as_bytes())),
        }
    }

    /// Turn a non-2xx response into a MediaError, preferring Cloudinary's own message
    async fn api_error(response: reqwest::Response) -> MediaError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        MediaError::Api { status, message }
    }
}

/// Sorted `k=v&k=v` string over the parameters that take part in the signature
fn string_to_sign(params: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl MediaBackend for CloudinaryClient {
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, MediaError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signed = [
            ("folder", MEDIA_FOLDER.to_string()),
            ("timestamp", timestamp),
            ("transformation", UPLOAD_TRANSFORMATION.to_string()),
        ];
        let signature = self.sign(&signed);

        let mut file = Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type.as_deref() {
            file = file.mime_str(content_type)?;
        }

        let mut form = Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", self.signature_algorithm.as_str());
        for (key, value) in signed {
            form = form.text(key, value);
        }

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let body: UploadResponse = response.json().await?;
        tracing::info!(public_id = %body.public_id, "uploaded video to Cloudinary");

        Ok(StoredMedia {
            public_id: body.public_id,
            secure_url: body.secure_url,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        let signed = [
            ("public_id", public_id.to_string()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ];
        let signature = self.sign(&signed);

        let mut params: Vec<(&str, String)> = signed.to_vec();
        params.push(("api_key", self.api_key.clone()));
        params.push(("signature", signature));
        params.push((
            "signature_algorithm",
            self.signature_algorithm.as_str().to_string(),
        ));

        let response = self
            .http
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let body: DestroyResponse = response.json().await?;
        match body.result.as_str() {
            "ok" => {
                tracing::info!(public_id, "deleted video from Cloudinary");
                Ok(())
            }
            "not found" => {
                tracing::warn!(public_id, "video already absent from Cloudinary");
                Ok(())
            }
            other => Err(MediaError::UnexpectedResponse(other.to_string())),
        }
    }

    fn thumbnail_url(&self, public_id: &str) -> String {
        format!(
            "{}/{}/video/upload/{}/{}.jpg",
            DELIVERY_BASE, self.cloud_name, THUMBNAIL_TRANSFORMATION, public_id
        )
    }
}
