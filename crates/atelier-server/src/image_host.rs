//! Client for the external image host: upload signatures and a proxied,
//! validated upload.

use std::collections::BTreeMap;

use reqwest::{Client, multipart};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Error;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Debug, Clone, Deserialize)]
pub struct ImageHostConfig {
  pub cloud_name:    String,
  pub api_key:       String,
  pub api_secret:    String,
  #[serde(default = "default_folder")]
  pub folder:        String,
  #[serde(default)]
  pub upload_preset: Option<String>,
  #[serde(default = "default_api_base")]
  pub api_base:      String,
}

fn default_folder() -> String { "portfolio".to_string() }

fn default_api_base() -> String { "https://api.cloudinary.com/v1_1".to_string() }

// ─── Signing ─────────────────────────────────────────────────────────────────

/// SHA-256 hex of `k1=v1&k2=v2…` (keys sorted) followed by the secret.
pub fn sign(params: &BTreeMap<&str, String>, secret: &str) -> String {
  let joined = params
    .iter()
    .map(|(k, v)| format!("{k}={v}"))
    .collect::<Vec<_>>()
    .join("&");
  let mut hasher = Sha256::new();
  hasher.update(joined.as_bytes());
  hasher.update(secret.as_bytes());
  hex::encode(hasher.finalize())
}

/// Everything a browser needs to upload directly to the host.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSignature {
  pub timestamp:     i64,
  pub signature:     String,
  pub api_key:       String,
  pub cloud_name:    String,
  pub folder:        String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub upload_preset: Option<String>,
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// An upload that passed the size, extension and content checks.
#[derive(Debug)]
pub struct Image {
  pub filename: String,
  pub mime:     &'static str,
  pub bytes:    Vec<u8>,
}

fn sniff(bytes: &[u8]) -> Option<&'static str> {
  match bytes {
    [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
    [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
    [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
    [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
    _ => None,
  }
}

pub fn validate(filename: &str, bytes: Vec<u8>) -> Result<Image, Error> {
  if bytes.is_empty() {
    return Err(Error::BadRequest("The uploaded file is empty.".into()));
  }
  if bytes.len() > MAX_UPLOAD_BYTES {
    return Err(Error::PayloadTooLarge("Images must be 5 MB or smaller.".into()));
  }
  let extension = filename
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_ascii_lowercase())
    .unwrap_or_default();
  if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
    return Err(Error::BadRequest(format!("Unsupported file type {extension:?}.")));
  }
  let mime = sniff(&bytes)
    .ok_or_else(|| Error::BadRequest("The file is not a JPEG, PNG, GIF or WebP image.".into()))?;
  Ok(Image { filename: filename.to_string(), mime, bytes })
}

// ─── Client ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct UploadResponse {
  secure_url: String,
}

pub struct ImageHost {
  http:   Client,
  config: ImageHostConfig,
}

impl ImageHost {
  pub fn new(config: ImageHostConfig) -> Result<Self, Error> {
    let http = Client::builder()
      .build()
      .map_err(|e| Error::Config(format!("image host client: {e}")))?;
    Ok(Self { http, config })
  }

  fn params(&self, timestamp: i64) -> BTreeMap<&'static str, String> {
    let mut params = BTreeMap::new();
    params.insert("folder", self.config.folder.clone());
    params.insert("timestamp", timestamp.to_string());
    if let Some(preset) = &self.config.upload_preset {
      params.insert("upload_preset", preset.clone());
    }
    params
  }

  pub fn signature(&self, timestamp: i64) -> UploadSignature {
    UploadSignature {
      timestamp,
      signature: sign(&self.params(timestamp), &self.config.api_secret),
      api_key: self.config.api_key.clone(),
      cloud_name: self.config.cloud_name.clone(),
      folder: self.config.folder.clone(),
      upload_preset: self.config.upload_preset.clone(),
    }
  }

  /// Upload `image` and return its public HTTPS URL.
  pub async fn upload(&self, image: Image, timestamp: i64) -> Result<String, Error> {
    let params = self.params(timestamp);
    let signature = sign(&params, &self.config.api_secret);
    let file = multipart::Part::bytes(image.bytes)
      .file_name(image.filename)
      .mime_str(image.mime)
      .map_err(|e| Error::BadRequest(e.to_string()))?;
    let form = params
      .into_iter()
      .fold(multipart::Form::new(), |form, (k, v)| form.text(k, v))
      .text("api_key", self.config.api_key.clone())
      .text("signature", signature)
      .part("file", file);

    let url = format!("{}/{}/image/upload", self.config.api_base, self.config.cloud_name);
    let res = self
      .http
      .post(&url)
      .multipart(form)
      .send()
      .await
      .map_err(|e| Error::Upstream(format!("could not reach the image host: {e}")))?;

    let status = res.status();
    if !status.is_success() {
      let body = res.text().await.unwrap_or_default();
      return Err(Error::Upstream(format!("image host answered {status}: {body}")));
    }
    let uploaded: UploadResponse = res
      .json()
      .await
      .map_err(|e| Error::Upstream(format!("unreadable image host response: {e}")))?;
    Ok(uploaded.secure_url)
  }
}
