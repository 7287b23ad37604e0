#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident image storage on an S3-compatible (`MinIO`-style) object store.
//!
//! Images arrive base64-encoded from the capture flow, are decoded and
//! uploaded under `billion-eyes-images/{imageId}.jpg`, and are served to
//! browsers through a public CDN host rather than the internal store
//! endpoint. [`normalize_image_url`] maps stored URLs onto that host.
//!
//! # Environment Variables
//!
//! | Variable | Required | Description |
//! |---|---|---|
//! | `S3_ENDPOINT_URL` | Yes | S3-compatible endpoint (e.g. a `MinIO` host) |
//! | `S3_ACCESS_KEY_ID` | Yes | Access key |
//! | `S3_SECRET_ACCESS_KEY` | Yes | Secret key |
//! | `S3_BUCKET` | No | Bucket name (default `billion-eyes-images`) |
//! | `IMAGE_PUBLIC_BASE` | No | Public CDN base for image URLs |

use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use base64::Engine as _;

/// Default bucket for incident images.
const DEFAULT_BUCKET: &str = "billion-eyes-images";

/// Internal object-store host that must never leak into browser-facing URLs.
const IMAGE_BASE_INTERNAL: &str = "http://192.168.192.177:9000";

/// Public CDN host that fronts the object store.
const IMAGE_BASE_PUBLIC: &str = "https://assets.omnivision.neuradyne.in";

/// Errors that can occur during image storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Missing required environment variable.
    #[error("Missing environment variable: {name}")]
    MissingEnv {
        /// Name of the missing environment variable.
        name: String,
    },

    /// The submitted payload was not valid base64.
    #[error("Invalid base64 image payload: {0}")]
    Decode(#[from] base64::DecodeError),

    /// S3 `PutObject` failed.
    #[error("Failed to upload s3://{bucket}/{key}: {source}")]
    Upload {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Underlying SDK error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Decodes a base64 JPEG payload from the capture flow.
///
/// # Errors
///
/// Returns [`StorageError::Decode`] if the payload is not valid base64.
pub fn decode_image(base64_string: &str) -> Result<Vec<u8>, StorageError> {
    Ok(base64::engine::general_purpose::STANDARD.decode(base64_string)?)
}

/// Client for storing incident images.
pub struct ImageStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base: String,
}

impl ImageStore {
    /// Creates an image store client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingEnv`] if any required variable is
    /// unset.
    pub fn from_env() -> Result<Self, StorageError> {
        let endpoint = require_env("S3_ENDPOINT_URL")?;
        let access_key = require_env("S3_ACCESS_KEY_ID")?;
        let secret_key = require_env("S3_SECRET_ACCESS_KEY")?;
        let bucket =
            std::env::var("S3_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string());
        let public_base = std::env::var("IMAGE_PUBLIC_BASE")
            .unwrap_or_else(|_| IMAGE_BASE_PUBLIC.to_string());

        let creds = Credentials::new(&access_key, &secret_key, None, None, "s3-env");

        let config = aws_sdk_s3::Config::builder()
            .endpoint_url(&endpoint)
            .region(Region::new("auto"))
            .credentials_provider(creds)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(config),
            bucket,
            public_base,
        })
    }

    /// Uploads a decoded JPEG and returns its public URL.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Upload`] if the put fails.
    pub async fn put_image(&self, image_id: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        let key = format!("{image_id}.jpg");
        let body = aws_sdk_s3::primitives::ByteStream::from(bytes);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("image/jpeg")
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                bucket: self.bucket.clone(),
                key: key.clone(),
                source: Box::new(e),
            })?;

        log::debug!("Stored incident image {key} ({})", self.bucket);

        Ok(format!("{}/{}/{key}", self.public_base, self.bucket))
    }
}

fn require_env(name: &str) -> Result<String, StorageError> {
    std::env::var(name).map_err(|_| StorageError::MissingEnv {
        name: name.to_string(),
    })
}

/// Rewrites a stored image URL onto the public CDN host.
///
/// - URLs already on the public host pass through.
/// - URLs on the internal store host are rewritten to the public host.
/// - Other absolute URLs are left untouched.
/// - Relative `/billion-eyes-images/...` paths get the public host prefixed.
/// - Anything else passes through unchanged; empty input yields `None`.
#[must_use]
pub fn normalize_image_url(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with(IMAGE_BASE_PUBLIC) {
        return Some(trimmed.to_string());
    }

    if let Some(rest) = trimmed.strip_prefix(IMAGE_BASE_INTERNAL) {
        return Some(format!("{IMAGE_BASE_PUBLIC}{rest}"));
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Some(trimmed.to_string());
    }

    if trimmed.starts_with("/billion-eyes-images/") {
        return Some(format!("{IMAGE_BASE_PUBLIC}{trimmed}"));
    }

    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_urls_pass_through() {
        let url = "https://assets.omnivision.neuradyne.in/billion-eyes-images/a.jpg";
        assert_eq!(normalize_image_url(url).unwrap(), url);
    }

    #[test]
    fn internal_host_is_rewritten() {
        let url = "http://192.168.192.177:9000/billion-eyes-images/a.jpg";
        assert_eq!(
            normalize_image_url(url).unwrap(),
            "https://assets.omnivision.neuradyne.in/billion-eyes-images/a.jpg"
        );
    }

    #[test]
    fn other_absolute_urls_are_untouched() {
        let url = "https://example.com/a.jpg";
        assert_eq!(normalize_image_url(url).unwrap(), url);
    }

    #[test]
    fn relative_owned_paths_get_the_public_host() {
        assert_eq!(
            normalize_image_url("/billion-eyes-images/a.jpg").unwrap(),
            "https://assets.omnivision.neuradyne.in/billion-eyes-images/a.jpg"
        );
    }

    #[test]
    fn empty_input_yields_none() {
        assert_eq!(normalize_image_url(""), None);
        assert_eq!(normalize_image_url("   "), None);
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        assert!(decode_image("not!!base64??").is_err());
        assert!(decode_image("aGVsbG8=").is_ok());
    }
}
