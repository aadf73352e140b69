// types.rs - Request and response bodies exchanged with the listing backend
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::StudioError;

/// Default marketplace profile sent with uploads.
pub const DEFAULT_PLATFORM: &str = "generic";

/// Keys the backend's listing schema marks as required.
pub const REQUIRED_METADATA_KEYS: [&str; 3] = ["title", "bullets", "description"];

// ============================================================================
// UPLOAD
// ============================================================================

/// An image file ready to be sent as the `file` part of the upload form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, StudioError> {
        let file_name = file_name.into();
        let content_type = image_content_type(&file_name)
            .ok_or_else(|| StudioError::NotAnImage(file_name.clone()))?;

        Ok(Self {
            file_name,
            content_type: content_type.to_string(),
            bytes,
        })
    }

    /// Read an image from disk. Non-image extensions are refused before any
    /// bytes are read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, StudioError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| StudioError::NotAnImage(path.display().to_string()))?;

        if image_content_type(&file_name).is_none() {
            return Err(StudioError::NotAnImage(file_name));
        }

        let bytes = tokio::fs::read(path).await?;
        Self::new(file_name, bytes)
    }
}

/// MIME type for the image extensions the backend accepts.
pub fn image_content_type(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();

    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

/// The upload form: image plus the optional category and target platform.
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub image: ImageUpload,
    pub category: Option<String>,
    pub platform: String,
}

impl UploadForm {
    pub fn new(image: ImageUpload) -> Self {
        Self {
            image,
            category: None,
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Category with surrounding whitespace removed; blank counts as absent.
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

// ============================================================================
// METADATA
// ============================================================================

/// Listing fields the backend generates for an uploaded image.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attributes: Option<Value>,
    #[serde(default)]
    pub ai_used: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct MetadataResponse {
    /// Server-side location of the stored upload, echoed back for visuals.
    pub image_path: String,
    pub metadata: ProductMetadata,
    /// The whole payload, kept verbatim for the preview.
    pub raw: Value,
}

impl MetadataResponse {
    pub fn from_value(raw: Value) -> Result<Self, StudioError> {
        let image_path = raw
            .get("image_path")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .ok_or(StudioError::MissingField("image_path"))?
            .to_string();

        let metadata = match serde_json::from_value::<ProductMetadata>(raw.clone()) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Metadata fields did not match the listing schema: {}", e);
                ProductMetadata::default()
            }
        };

        Ok(Self {
            image_path,
            metadata,
            raw,
        })
    }

    /// Required listing keys absent from the payload.
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_METADATA_KEYS
            .iter()
            .copied()
            .filter(|key| self.raw.get(*key).map_or(true, Value::is_null))
            .collect()
    }

    /// Two-space indented JSON, as shown in the metadata preview.
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string())
    }
}

// ============================================================================
// VISUALS AND VIDEO
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisualsRequest {
    pub image_path: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisualsResponse {
    pub generated: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRequest {
    pub frames: Vec<String>,
    pub fps: u32,
    pub tts: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoResponse {
    pub video_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_content_type() {
        assert_eq!(image_content_type("shoe.PNG"), Some("image/png"));
        assert_eq!(image_content_type("a.b.jpeg"), Some("image/jpeg"));
        assert_eq!(image_content_type("notes.txt"), None);
        assert_eq!(image_content_type("no_extension"), None);
    }

    #[test]
    fn test_upload_rejects_non_image() {
        let err = ImageUpload::new("listing.csv", vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, StudioError::NotAnImage(name) if name == "listing.csv"));
    }

    #[tokio::test]
    async fn test_upload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mug.jpg");
        tokio::fs::write(&path, b"jpeg-bytes").await.unwrap();

        let upload = ImageUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name, "mug.jpg");
        assert_eq!(upload.content_type, "image/jpeg");
        assert_eq!(upload.bytes, b"jpeg-bytes");
    }

    #[test]
    fn test_blank_category_is_absent() {
        let image = ImageUpload::new("a.png", vec![]).unwrap();
        let form = UploadForm::new(image).with_category("   ");
        assert_eq!(form.category(), None);
        assert_eq!(form.platform, "generic");
    }

    #[test]
    fn test_metadata_response_parsing() {
        let raw = json!({
            "title": "Blue Mug",
            "bullets": ["Ceramic", "350ml"],
            "description": "A mug.",
            "tags": ["kitchen"],
            "ai_used": false,
            "image_path": "data/uploads/abc_mug.png"
        });

        let response = MetadataResponse::from_value(raw).unwrap();
        assert_eq!(response.image_path, "data/uploads/abc_mug.png");
        assert_eq!(response.metadata.title.as_deref(), Some("Blue Mug"));
        assert_eq!(response.metadata.bullets.len(), 2);
        assert!(response.missing_required().is_empty());
        assert!(response.pretty().contains("\n  \"bullets\": ["));
    }

    #[test]
    fn test_metadata_requires_image_path() {
        let err = MetadataResponse::from_value(json!({"title": "x"})).unwrap_err();
        assert!(matches!(err, StudioError::MissingField("image_path")));
    }

    #[test]
    fn test_metadata_tolerates_odd_fields() {
        let raw = json!({"image_path": "p.png", "bullets": "not a list"});
        let response = MetadataResponse::from_value(raw).unwrap();
        assert_eq!(response.metadata, ProductMetadata::default());
        assert_eq!(response.missing_required(), vec!["title", "description"]);
    }
}
