//! GeminiImageService - image generation over the Gemini REST API.
//!
//! Garment images are sent inline (base64) together with a rendered text
//! instruction; the first inline image of the response becomes the result.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use fitcheck_core::config::{GenerationConfig, SecretConfig};
use fitcheck_core::error::{FitCheckError, GenerationError};
use fitcheck_core::generation::{CompositeRequest, GenerationService, ImagePayload, ImageResolver};
use fitcheck_core::pose::Pose;
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};

use crate::prompts;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// [`GenerationService`] backed by a Gemini image model.
#[derive(Clone)]
pub struct GeminiImageService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
    max_accessories: Option<usize>,
    resolver: Arc<dyn ImageResolver>,
}

impl GeminiImageService {
    /// Creates a service with the default endpoint, model and timeout.
    pub fn new(api_key: impl Into<String>, resolver: Arc<dyn ImageResolver>) -> Self {
        let defaults = GenerationConfig::default();
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: defaults.model.clone(),
            base_url: defaults.api_base_url.clone(),
            timeout: defaults.request_timeout(),
            max_accessories: defaults.max_accessories_per_request,
            resolver,
        }
    }

    /// Builds the service from `config.toml` settings and `secret.json`.
    ///
    /// A model name in `secret.json` overrides the configured model.
    pub fn from_config(
        config: &GenerationConfig,
        secrets: &SecretConfig,
        resolver: Arc<dyn ImageResolver>,
    ) -> Result<Self, FitCheckError> {
        let gemini = secrets
            .gemini
            .as_ref()
            .filter(|gemini| !gemini.api_key.trim().is_empty())
            .ok_or_else(|| {
                FitCheckError::config("Gemini API key not found in secret.json or GEMINI_API_KEY")
            })?;

        let model = gemini
            .model_name
            .clone()
            .unwrap_or_else(|| config.model.clone());

        Ok(Self::new(gemini.api_key.clone(), resolver)
            .with_model(model)
            .with_base_url(config.api_base_url.clone())
            .with_timeout(config.request_timeout())
            .with_max_accessories(config.max_accessories_per_request))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Caps the accessory images per call; `None` sends all of them.
    pub fn with_max_accessories(mut self, max_accessories: Option<usize>) -> Self {
        self.max_accessories = max_accessories;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn resolve_base(&self, base_image: &str) -> Result<ImagePayload, GenerationError> {
        self.resolve_input(base_image, "base image").await
    }

    async fn resolve_input(&self, reference: &str, what: &str) -> Result<ImagePayload, GenerationError> {
        if reference.trim().is_empty() {
            return Err(GenerationError::InvalidInput(format!("{what} is missing")));
        }
        self.resolver
            .fetch(reference)
            .await
            .map_err(|e| GenerationError::InvalidInput(format!("{what} could not be loaded: {e}")))
    }

    /// Builds the request body: model image, garment images, then the instruction.
    fn composite_body(
        &self,
        base: ImagePayload,
        request: CompositeRequest,
    ) -> Result<GenerateContentRequest, GenerationError> {
        let mut labelled: Vec<(&str, ImagePayload)> = Vec::new();
        if let Some(full_body) = request.full_body {
            labelled.push(("full-body outfit", full_body));
        }
        if let Some(top) = request.top {
            labelled.push(("top", top));
        }
        if let Some(bottom) = request.bottom {
            labelled.push(("bottom", bottom));
        }

        let accessory_total = request.accessories.len();
        let accessory_limit = self.max_accessories.unwrap_or(accessory_total);
        if accessory_total > accessory_limit {
            tracing::debug!(
                "Sending {} of {} accessories (per-request cap)",
                accessory_limit,
                accessory_total
            );
        }
        labelled.extend(
            request
                .accessories
                .into_iter()
                .take(accessory_limit)
                .map(|accessory| ("accessory", accessory)),
        );

        if labelled.is_empty() {
            return Err(GenerationError::InvalidInput(
                "composite request carries no garment image".into(),
            ));
        }

        let labels: Vec<&str> = labelled.iter().map(|(label, _)| *label).collect();
        let instruction = prompts::composite_instruction(&labels)?;

        let mut parts = vec![Part::inline(&base)];
        parts.extend(labelled.iter().map(|(_, payload)| Part::inline(payload)));
        parts.push(Part::Text { text: instruction });

        Ok(GenerateContentRequest::image_request(parts))
    }

    fn repose_body(
        &self,
        base: ImagePayload,
        instruction: &str,
    ) -> Result<GenerateContentRequest, GenerationError> {
        let text = prompts::repose_instruction(instruction)?;
        Ok(GenerateContentRequest::image_request(vec![
            Part::inline(&base),
            Part::Text { text },
        ]))
    }

    fn model_body(&self, photo: ImagePayload) -> Result<GenerateContentRequest, GenerationError> {
        let text = prompts::model_instruction(Pose::Standing.instruction())?;
        Ok(GenerateContentRequest::image_request(vec![
            Part::inline(&photo),
            Part::Text { text },
        ]))
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, GenerationError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        // reqwest errors carry the request url; keep messages free of it
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                let err = err.without_url();
                if err.is_connect() || err.is_timeout() {
                    GenerationError::Unreachable(format!("Gemini API request failed: {err}"))
                } else {
                    GenerationError::Rejected {
                        status: None,
                        message: format!("Gemini API request failed: {err}"),
                        retryable: false,
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|err| GenerationError::Rejected {
                status: None,
                message: format!("Failed to parse Gemini response: {}", err.without_url()),
                retryable: false,
            })?;

        extract_image_response(parsed)
    }
}

#[async_trait]
impl GenerationService for GeminiImageService {
    async fn composite(&self, request: CompositeRequest) -> Result<String, GenerationError> {
        let base = self.resolve_base(&request.base_image).await?;
        let body = self.composite_body(base, request)?;
        tracing::debug!("Gemini composite request with {} parts", body.part_count());
        self.send_request(&body).await
    }

    async fn repose(&self, base_image: &str, instruction: &str) -> Result<String, GenerationError> {
        let base = self.resolve_base(base_image).await?;
        let body = self.repose_body(base, instruction)?;
        self.send_request(&body).await
    }

    async fn generate_model(&self, photo: &str) -> Result<String, GenerationError> {
        let photo = self.resolve_input(photo, "photo").await?;
        let body = self.model_body(photo)?;
        tracing::debug!("Gemini model request with {} parts", body.part_count());
        self.send_request(&body).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationSettings,
}

impl GenerateContentRequest {
    fn image_request(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationSettings {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }

    fn part_count(&self) -> usize {
        self.contents.iter().map(|content| content.parts.len()).sum()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings {
    response_modalities: Vec<String>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

impl Part {
    fn inline(payload: &ImagePayload) -> Self {
        Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type: payload.mime_type.clone(),
                data: BASE64_STANDARD.encode(&payload.bytes),
            },
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    #[serde(rename = "inlineData", alias = "inline_data")]
    inline_data: Option<InlineDataPayload>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_image_response(response: GenerateContentResponse) -> Result<String, GenerationError> {
    response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .find_map(|part| part.inline_data)
        .filter(|inline| !inline.data.is_empty())
        .map(|inline| format!("data:{};base64,{}", inline.mime_type, inline.data))
        .ok_or(GenerationError::EmptyResult)
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> GenerationError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    let message = match retry_after {
        Some(delay) => format!("{message} (retry after {}s)", delay.as_secs()),
        None => message,
    };

    GenerationError::Rejected {
        status: Some(status.as_u16()),
        message,
        retryable,
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitcheck_core::config::GeminiConfig;
    use fitcheck_core::error::Result;

    struct StaticResolver;

    #[async_trait]
    impl ImageResolver for StaticResolver {
        async fn fetch(&self, url: &str) -> Result<ImagePayload> {
            if url == "missing.png" {
                return Err(FitCheckError::resolution(url, "not found"));
            }
            Ok(ImagePayload::new("image/png", url.as_bytes().to_vec()))
        }
    }

    fn service() -> GeminiImageService {
        GeminiImageService::new("test-key", Arc::new(StaticResolver))
    }

    fn png(tag: &str) -> ImagePayload {
        ImagePayload::new("image/png", tag.as_bytes().to_vec())
    }

    fn body_json(body: &GenerateContentRequest) -> serde_json::Value {
        serde_json::to_value(body).unwrap()
    }

    #[test]
    fn test_composite_body_orders_parts() {
        let request = CompositeRequest::new("model.png", None, Some(png("top")), None, vec![png("hat")]);
        let body = service().composite_body(png("model"), request).unwrap();
        let json = body_json(&body);

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0]["inlineData"]["data"], BASE64_STANDARD.encode("model"));
        assert_eq!(parts[1]["inlineData"]["data"], BASE64_STANDARD.encode("top"));
        assert_eq!(parts[2]["inlineData"]["data"], BASE64_STANDARD.encode("hat"));
        assert!(parts[3]["text"].as_str().unwrap().contains("Image 3 is the accessory."));
        assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[test]
    fn test_accessory_cap_applies() {
        let request = CompositeRequest::new(
            "model.png",
            None,
            None,
            None,
            vec![png("a1"), png("a2"), png("a3")],
        );
        let body = service()
            .with_max_accessories(Some(1))
            .composite_body(png("model"), request.clone())
            .unwrap();
        assert_eq!(body.part_count(), 3);

        let uncapped = service().composite_body(png("model"), request).unwrap();
        assert_eq!(uncapped.part_count(), 5);
    }

    #[test]
    fn test_empty_composite_is_invalid_input() {
        let request = CompositeRequest::new("model.png", None, None, None, vec![]);
        let err = service().composite_body(png("model"), request).err().unwrap();
        assert!(matches!(err, GenerationError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unloadable_base_is_invalid_input() {
        let request = CompositeRequest::new("missing.png", None, Some(png("top")), None, vec![]);
        let err = service().composite(request).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidInput(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_extract_image_response() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Here is your outfit"},
                    {"inlineData": {"mimeType": "image/png", "data": "AAEC"}}
                ]}
            }]
        }))
        .unwrap();
        assert_eq!(extract_image_response(response).unwrap(), "data:image/png;base64,AAEC");

        let text_only: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "I cannot do that"}]}}]
        }))
        .unwrap();
        assert_eq!(extract_image_response(text_only), Err(GenerationError::EmptyResult));
    }

    #[test]
    fn test_map_http_error() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body.to_string(), Some(Duration::from_secs(7)));
        match err {
            GenerationError::Rejected { status, message, retryable } => {
                assert_eq!(status, Some(429));
                assert!(retryable);
                assert_eq!(message, "RESOURCE_EXHAUSTED: Quota exceeded (retry after 7s)");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = map_http_error(StatusCode::BAD_REQUEST, "plain failure".to_string(), None);
        assert!(!err.is_retryable());
    }

    /// Accepts one request, answers with `response` and returns the request head.
    fn serve_once(response: String) -> (String, std::thread::JoinHandle<String>) {
        use std::io::{BufRead, BufReader, Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                let end_of_head = line == "\r\n";
                head.push_str(&line);
                if end_of_head {
                    break;
                }
            }
            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();
            stream.write_all(response.as_bytes()).unwrap();
            head
        });
        (format!("http://{addr}/v1beta/models"), handle)
    }

    #[tokio::test]
    async fn test_api_key_sent_as_header() {
        let body = r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"AAEC"}}]}}]}"#;
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let (base_url, server) = serve_once(response);
        let service = GeminiImageService::new("secret-key", Arc::new(StaticResolver)).with_base_url(base_url);

        let image = service.repose("model.png", "side view").await.unwrap();
        assert_eq!(image, "data:image/png;base64,AAEC");

        let head = server.join().unwrap();
        let request_line = head.lines().next().unwrap();
        assert!(request_line.contains("/gemini-2.5-flash-image:generateContent"));
        assert!(!request_line.contains("secret-key"));
        assert!(head.to_ascii_lowercase().contains("x-goog-api-key: secret-key"));
    }

    #[tokio::test]
    async fn test_transport_error_hides_key_and_url() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                drop(stream);
            }
        });
        let service = GeminiImageService::new("secret-key", Arc::new(StaticResolver))
            .with_base_url(format!("http://{addr}/v1beta/models"));

        let err = service.repose("model.png", "side view").await.unwrap_err();

        let text = format!("{err} {err:?}");
        assert!(!text.contains("secret-key"), "{text}");
        assert!(!text.contains(&addr.to_string()), "{text}");
    }

    #[tokio::test]
    async fn test_generate_model_sends_photo_and_instruction() {
        let body = service().model_body(png("me")).unwrap();
        let json = body_json(&body);
        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inlineData"]["data"], BASE64_STANDARD.encode("me"));
        assert!(parts[1]["text"].as_str().unwrap().contains("standing straight"));

        let err = service().generate_model("missing.png").await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidInput(ref message) if message.starts_with("photo")));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = GenerationConfig::default();
        let missing = GeminiImageService::from_config(&config, &SecretConfig::default(), Arc::new(StaticResolver));
        assert!(missing.is_err());

        let secrets = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: "k".into(),
                model_name: Some("override-model".into()),
            }),
        };
        let service = GeminiImageService::from_config(&config, &secrets, Arc::new(StaticResolver)).unwrap();
        assert_eq!(service.model(), "override-model");
    }
}
