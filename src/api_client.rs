// src/api_client.rs
//! HTTP client for the listing backend.
//!
//! Three JSON-over-HTTP calls drive the workflow (metadata, visuals, video);
//! `health`, `wait_until_healthy` and `download` support the CLI around them.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::StudioConfig;
use crate::error::{backend_error_message, embedded_status, StudioError, FALLBACK_ERROR_MESSAGE};
use crate::types::{
    HealthResponse, MetadataResponse, UploadForm, VideoRequest, VideoResponse, VisualsRequest,
    VisualsResponse,
};
use crate::workflow::gallery::web_path;

pub const METADATA_PATH: &str = "generate-metadata";
pub const VISUALS_PATH: &str = "api/generate-visuals";
pub const VIDEO_PATH: &str = "api/generate-video";
pub const HEALTH_PATH: &str = "health";

const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The backend operations the workflow depends on.
#[async_trait]
pub trait StudioBackend: Send + Sync {
    async fn generate_metadata(&self, form: &UploadForm) -> Result<MetadataResponse, StudioError>;

    async fn generate_visuals(&self, request: &VisualsRequest) -> Result<VisualsResponse, StudioError>;

    async fn generate_video(&self, request: &VideoRequest) -> Result<VideoResponse, StudioError>;
}

#[derive(Debug, Clone)]
pub struct StudioClient {
    client: Client,
    base_url: Url,
}

impl StudioClient {
    pub fn new(base_url: Url) -> Result<Self, StudioError> {
        Self::build(base_url, None)
    }

    pub fn from_config(config: &StudioConfig) -> Result<Self, StudioError> {
        Self::build(config.backend_url.clone(), config.request_timeout)
    }

    fn build(mut base_url: Url, timeout: Option<Duration>) -> Result<Self, StudioError> {
        // Relative joins drop the last segment unless the base ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Turn a path returned by the backend into an absolute URL.
    pub fn resolve(&self, path: &str) -> Result<Url, StudioError> {
        resolve_against(&self.base_url, path)
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<HealthResponse, StudioError> {
        let request = self.client.get(self.base_url.join(HEALTH_PATH)?);
        let body = self.execute("GET", HEALTH_PATH, request).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Poll `/health` once per second until the backend answers with a status
    /// below 500 or `timeout` runs out.
    pub async fn wait_until_healthy(&self, timeout: Duration) -> Result<(), StudioError> {
        let url = self.base_url.join(HEALTH_PATH)?;
        let deadline = Instant::now() + timeout;

        loop {
            match self.client.get(url.clone()).send().await {
                Ok(response) if response.status().as_u16() < 500 => {
                    info!(status = %response.status().as_u16(), "backend is ready");
                    return Ok(());
                }
                Ok(response) => debug!(status = %response.status().as_u16(), "backend not ready yet"),
                Err(e) => debug!("backend not reachable yet: {}", e),
            }

            let now = Instant::now();
            if now >= deadline {
                warn!("backend did not become healthy within {:?}", timeout);
                return Err(StudioError::Unhealthy(timeout));
            }
            tokio::time::sleep(HEALTH_POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    /// Save a generated visual or video under `dest_dir`, keeping the
    /// backend's file name.
    pub async fn download(&self, path: &str, dest_dir: &Path) -> Result<PathBuf, StudioError> {
        let url = self.resolve(path)?;
        info!("⬇️ Downloading {}", url);

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            error!(status = %status, "download failed for {}", url);
            return Err(StudioError::Backend {
                status,
                message: format!("Failed to download {}", url),
            });
        }

        let bytes = response.bytes().await?;
        let file_name = url
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|name| !name.is_empty())
            .unwrap_or("download")
            .to_string();

        tokio::fs::create_dir_all(dest_dir).await?;
        let destination = dest_dir.join(file_name);
        tokio::fs::write(&destination, &bytes).await?;

        info!("✅ Saved {} bytes to {}", bytes.len(), destination.display());
        Ok(destination)
    }

    /// Send a request and return its JSON body, turning rejections into
    /// `StudioError::Backend`.
    async fn execute(
        &self,
        method: &'static str,
        path: &'static str,
        request: RequestBuilder,
    ) -> Result<Value, StudioError> {
        let request_id = Uuid::new_v4().to_string();
        let start = Instant::now();

        info!(request_id = %request_id, method = %method, path = %path, "sending backend request");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    duration_ms = %start.elapsed().as_millis(),
                    "backend request failed: {}",
                    e
                );
                return Err(e.into());
            }
        };

        let status = response.status();
        let text = response.text().await?;
        let duration = start.elapsed();

        match status.as_u16() {
            200..=399 => info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = %status.as_u16(),
                duration_ms = %duration.as_millis(),
                "backend request completed"
            ),
            400..=499 => warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = %status.as_u16(),
                duration_ms = %duration.as_millis(),
                "backend rejected request"
            ),
            _ => error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = %status.as_u16(),
                duration_ms = %duration.as_millis(),
                "backend error"
            ),
        }

        interpret_body(status, &text)
    }
}

/// Decide whether a response body is a success payload or a rejection.
fn interpret_body(status: StatusCode, text: &str) -> Result<Value, StudioError> {
    let parsed = serde_json::from_str::<Value>(text);

    if !status.is_success() {
        let message = parsed
            .ok()
            .as_ref()
            .and_then(backend_error_message)
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
        return Err(StudioError::Backend {
            status: status.as_u16(),
            message,
        });
    }

    let body = parsed?;

    // Some handlers report errors in a 2xx body
    let paired = embedded_status(&body);
    let rejected = paired.is_some() || body.get("error").is_some() || body.get("detail").is_some();
    if rejected {
        if let Some(message) = backend_error_message(&body) {
            return Err(StudioError::Backend {
                status: paired.unwrap_or_else(|| status.as_u16()),
                message,
            });
        }
    }

    Ok(body)
}

pub(crate) fn resolve_against(base: &Url, path: &str) -> Result<Url, StudioError> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(Url::parse(path)?);
    }
    let relative = web_path(path);
    Ok(base.join(relative.trim_start_matches('/'))?)
}

#[async_trait]
impl StudioBackend for StudioClient {
    async fn generate_metadata(&self, form: &UploadForm) -> Result<MetadataResponse, StudioError> {
        let file = Part::bytes(form.image.bytes.clone())
            .file_name(form.image.file_name.clone())
            .mime_str(&form.image.content_type)?;

        let mut multipart = Form::new()
            .part("file", file)
            .text("platform", form.platform.clone());
        if let Some(category) = form.category() {
            multipart = multipart.text("category", category.to_string());
        }

        info!(
            "📤 Uploading {} ({} bytes) for metadata",
            form.image.file_name,
            form.image.bytes.len()
        );

        let request = self
            .client
            .post(self.base_url.join(METADATA_PATH)?)
            .multipart(multipart);
        let body = self.execute("POST", METADATA_PATH, request).await?;

        MetadataResponse::from_value(body)
    }

    async fn generate_visuals(&self, request: &VisualsRequest) -> Result<VisualsResponse, StudioError> {
        let builder = self
            .client
            .post(self.base_url.join(VISUALS_PATH)?)
            .json(request);
        let body = self.execute("POST", VISUALS_PATH, builder).await?;

        let visuals: VisualsResponse = serde_json::from_value(body)?;
        info!("✅ Backend generated {} visuals", visuals.generated.len());
        Ok(visuals)
    }

    async fn generate_video(&self, request: &VideoRequest) -> Result<VideoResponse, StudioError> {
        let builder = self
            .client
            .post(self.base_url.join(VIDEO_PATH)?)
            .json(request);
        let body = self.execute("POST", VIDEO_PATH, builder).await?;

        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageUpload;
    use axum::extract::Multipart;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    async fn spawn_backend(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{}/", addr)).unwrap()
    }

    async fn echo_upload(mut multipart: Multipart) -> Json<Value> {
        let mut fields = serde_json::Map::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.unwrap();
                fields.insert("file_name".into(), json!(file_name));
                fields.insert("content_type".into(), json!(content_type));
                fields.insert("size".into(), json!(bytes.len()));
            } else {
                let text = field.text().await.unwrap();
                fields.insert(name, json!(text));
            }
        }
        fields.insert("title".into(), json!("Blue Mug"));
        fields.insert("image_path".into(), json!("data/uploads/abc_mug.png"));
        Json(Value::Object(fields))
    }

    fn upload_form() -> UploadForm {
        UploadForm::new(ImageUpload::new("mug.png", vec![0u8; 16]).unwrap()).with_category("Kitchen")
    }

    #[tokio::test]
    async fn test_metadata_upload_sends_multipart_form() {
        let base = spawn_backend(Router::new().route("/generate-metadata", post(echo_upload))).await;
        let client = StudioClient::new(base).unwrap();

        let response = client.generate_metadata(&upload_form()).await.unwrap();

        assert_eq!(response.image_path, "data/uploads/abc_mug.png");
        assert_eq!(response.raw["file_name"], "mug.png");
        assert_eq!(response.raw["content_type"], "image/png");
        assert_eq!(response.raw["size"], 16);
        assert_eq!(response.raw["category"], "Kitchen");
        assert_eq!(response.raw["platform"], "generic");
    }

    #[tokio::test]
    async fn test_metadata_detail_is_reported() {
        let router = Router::new().route(
            "/generate-metadata",
            post(|| async {
                (
                    AxumStatus::BAD_REQUEST,
                    Json(json!({"detail": "File must be an image"})),
                )
            }),
        );
        let client = StudioClient::new(spawn_backend(router).await).unwrap();

        let err = client.generate_metadata(&upload_form()).await.unwrap_err();
        match err {
            StudioError::Backend { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "File must be an image");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_visuals_error_message_reaches_caller() {
        let router = Router::new().route(
            "/api/generate-visuals",
            post(|| async { (AxumStatus::BAD_REQUEST, Json(json!({"error": "bad input"}))) }),
        );
        let client = StudioClient::new(spawn_backend(router).await).unwrap();
        let request = VisualsRequest {
            image_path: "p.png".into(),
            title: "Product".into(),
        };

        let err = client.generate_visuals(&request).await.unwrap_err();
        assert!(err.to_string().contains("bad input"));
    }

    #[tokio::test]
    async fn test_visuals_round_trip() {
        let router = Router::new().route(
            "/api/generate-visuals",
            post(|Json(body): Json<VisualsRequest>| async move {
                Json(json!({"generated": [
                    format!("outputs/supplementary/{}_0.png", body.title),
                    "outputs/supplementary/1.png"
                ]}))
            }),
        );
        let client = StudioClient::new(spawn_backend(router).await).unwrap();
        let request = VisualsRequest {
            image_path: "p.png".into(),
            title: "Mug".into(),
        };

        let response = client.generate_visuals(&request).await.unwrap();
        assert_eq!(
            response.generated,
            vec!["outputs/supplementary/Mug_0.png", "outputs/supplementary/1.png"]
        );
    }

    #[tokio::test]
    async fn test_error_pair_in_success_body_is_a_failure() {
        let router = Router::new().route(
            "/api/generate-video",
            post(|| async { Json(json!([{"error": "frames or prompt required"}, 400])) }),
        );
        let client = StudioClient::new(spawn_backend(router).await).unwrap();
        let request = VideoRequest {
            frames: vec![],
            fps: 2,
            tts: "hi".into(),
        };

        match client.generate_video(&request).await.unwrap_err() {
            StudioError::Backend { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "frames or prompt required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_object_in_success_body_is_a_failure() {
        let router = Router::new().route(
            "/api/generate-visuals",
            post(|| async { Json(json!({"error": "image not found: p.png"})) }),
        );
        let client = StudioClient::new(spawn_backend(router).await).unwrap();
        let request = VisualsRequest {
            image_path: "p.png".into(),
            title: "Product".into(),
        };

        match client.generate_visuals(&request).await.unwrap_err() {
            StudioError::Backend { status, message } => {
                assert_eq!(status, 200);
                assert_eq!(message, "image not found: p.png");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_null_error_key_is_a_success() {
        let router = Router::new().route(
            "/api/generate-visuals",
            post(|| async { Json(json!({"generated": ["outputs/a.png"], "error": null})) }),
        );
        let client = StudioClient::new(spawn_backend(router).await).unwrap();
        let request = VisualsRequest {
            image_path: "p.png".into(),
            title: "Product".into(),
        };

        let response = client.generate_visuals(&request).await.unwrap();
        assert_eq!(response.generated, vec!["outputs/a.png"]);
    }

    #[tokio::test]
    async fn test_non_json_failure_uses_fallback_message() {
        let router = Router::new().route(
            "/api/generate-video",
            post(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = StudioClient::new(spawn_backend(router).await).unwrap();
        let request = VideoRequest {
            frames: vec!["a.png".into()],
            fps: 2,
            tts: "hi".into(),
        };

        match client.generate_video(&request).await.unwrap_err() {
            StudioError::Backend { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Server error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_health_and_download() {
        let router = Router::new()
            .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
            .route("/outputs/videos/slideshow_1.mp4", get(|| async { "video-bytes" }));
        let client = StudioClient::new(spawn_backend(router).await).unwrap();

        assert_eq!(client.health().await.unwrap().status, "ok");
        client.wait_until_healthy(Duration::from_secs(5)).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let saved = client
            .download("/outputs/videos/slideshow_1.mp4", dir.path())
            .await
            .unwrap();
        assert_eq!(saved, dir.path().join("slideshow_1.mp4"));
        assert_eq!(tokio::fs::read(&saved).await.unwrap(), b"video-bytes");
    }

    #[tokio::test]
    async fn test_wait_until_healthy_times_out() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = StudioClient::new(Url::parse(&format!("http://{}/", addr)).unwrap()).unwrap();
        let err = client
            .wait_until_healthy(Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::Unhealthy(_)));
    }

    #[test]
    fn test_resolve_paths() {
        let client = StudioClient::new(Url::parse("http://studio.local:8000/app").unwrap()).unwrap();
        assert_eq!(client.base_url().as_str(), "http://studio.local:8000/app/");
        assert_eq!(
            client.resolve("/outputs/videos/v.mp4").unwrap().as_str(),
            "http://studio.local:8000/app/outputs/videos/v.mp4"
        );
        assert_eq!(
            client.resolve("outputs\\supplementary\\a.png").unwrap().as_str(),
            "http://studio.local:8000/app/outputs/supplementary/a.png"
        );
        assert_eq!(
            client.resolve("https://cdn.example.com/v.mp4").unwrap().as_str(),
            "https://cdn.example.com/v.mp4"
        );
    }
}
