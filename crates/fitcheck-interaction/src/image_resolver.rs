//! Resolves image references (data URLs, local files and remote URLs) into bytes.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use fitcheck_core::error::{FitCheckError, Result};
use fitcheck_core::generation::{ImagePayload, ImageResolver};
use reqwest::Client;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const FALLBACK_MIME_TYPE: &str = "image/png";

/// [`ImageResolver`] decoding `data:` URLs and reading `file://` URLs locally,
/// fetching everything else over HTTP.
#[derive(Clone)]
pub struct HttpImageResolver {
    client: Client,
    timeout: Duration,
}

impl HttpImageResolver {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch_remote(&self, url: &str) -> Result<ImagePayload> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| FitCheckError::resolution(url, format!("request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FitCheckError::resolution(url, format!("HTTP {status}")));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
            .filter(|value| value.starts_with("image/"))
            .unwrap_or_else(|| mime_from_extension(url).to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|err| FitCheckError::resolution(url, format!("failed to read body: {err}")))?;

        if bytes.is_empty() {
            return Err(FitCheckError::resolution(url, "empty body"));
        }

        Ok(ImagePayload::new(mime_type, bytes.to_vec()))
    }
}

impl Default for HttpImageResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageResolver for HttpImageResolver {
    async fn fetch(&self, url: &str) -> Result<ImagePayload> {
        if url.starts_with("data:") {
            return decode_data_url(url);
        }
        if let Some(path) = url.strip_prefix("file://") {
            return read_image_file(Path::new(path)).await;
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return self.fetch_remote(url).await;
        }
        Err(FitCheckError::resolution(url, "unsupported image reference"))
    }
}

/// Decodes a base64 `data:` URL.
pub fn decode_data_url(url: &str) -> Result<ImagePayload> {
    let preview: String = url.chars().take(32).collect();
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| FitCheckError::resolution(&preview, "not a data URL"))?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| FitCheckError::resolution(&preview, "missing data separator"))?;

    let mut header_parts = header.split(';');
    let mime_type = header_parts
        .next()
        .filter(|mime| !mime.is_empty())
        .unwrap_or(FALLBACK_MIME_TYPE)
        .to_string();
    if !header_parts.any(|part| part == "base64") {
        return Err(FitCheckError::resolution(&preview, "only base64 data URLs are supported"));
    }

    let bytes = BASE64_STANDARD
        .decode(data.trim())
        .map_err(|err| FitCheckError::resolution(&preview, format!("invalid base64: {err}")))?;
    Ok(ImagePayload::new(mime_type, bytes))
}

/// Reads an image the user holds locally.
pub async fn read_image_file(path: &Path) -> Result<ImagePayload> {
    let location = path.display().to_string();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| FitCheckError::resolution(&location, format!("cannot read file: {err}")))?;
    if bytes.is_empty() {
        return Err(FitCheckError::resolution(&location, "empty file"));
    }
    Ok(ImagePayload::new(mime_from_extension(&location), bytes))
}

/// `file://` URL of an absolute path.
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Encodes a payload as a base64 `data:` URL.
pub fn encode_data_url(payload: &ImagePayload) -> String {
    format!(
        "data:{};base64,{}",
        payload.mime_type,
        BASE64_STANDARD.encode(&payload.bytes)
    )
}

fn mime_from_extension(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    match path.rsplit('.').next() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => FALLBACK_MIME_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_round_trip() {
        let payload = ImagePayload::new("image/jpeg", vec![0xff, 0xd8, 0xff]);
        let url = encode_data_url(&payload);
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(decode_data_url(&url).unwrap(), payload);
    }

    #[test]
    fn test_rejects_non_base64_data_url() {
        let err = decode_data_url("data:text/plain,hello").unwrap_err();
        assert!(err.is_resolution());
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension("https://cdn.example/a/shirt.JPG?v=2"), "image/jpeg");
        assert_eq!(mime_from_extension("https://cdn.example/a/shirt.webp"), "image/webp");
        assert_eq!(mime_from_extension("https://cdn.example/a/shirt"), "image/png");
    }

    #[tokio::test]
    async fn test_unsupported_reference() {
        let resolver = HttpImageResolver::new();
        let err = resolver.fetch("blob:local-object-7").await.unwrap_err();
        assert!(err.is_resolution());
    }

    #[tokio::test]
    async fn test_data_url_needs_no_network() {
        let resolver = HttpImageResolver::new();
        let payload = resolver.fetch("data:image/png;base64,AAEC").await.unwrap();
        assert_eq!(payload.bytes, vec![0, 1, 2]);
        assert_eq!(payload.mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_file_url_reads_local_image() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dress.jpg");
        std::fs::write(&path, [0xff, 0xd8, 0xff, 0xe0]).unwrap();

        let payload = HttpImageResolver::new().fetch(&file_url(&path)).await.unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
        assert_eq!(payload.len(), 4);

        let missing = read_image_file(&dir.path().join("missing.png")).await.unwrap_err();
        assert!(missing.is_resolution());
    }
}
