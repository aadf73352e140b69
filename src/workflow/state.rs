// WorkflowState - What the current session has produced so far
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StudioError;
use crate::types::{VideoRequest, VisualsRequest};

/// Furthest step the session has completed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkflowStage {
    Idle,
    MetadataReady,
    VisualsReady,
    VideoReady,
}

/// Owned by the controller; updated only after a backend response arrives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Server-side path of the last uploaded image
    last_image_path: Option<String>,

    /// Visuals generated for that image, in backend order
    last_generated_visuals: Vec<String>,

    last_video_url: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowState {
    pub fn new() -> Self {
        Self {
            last_image_path: None,
            last_generated_visuals: Vec::new(),
            last_video_url: None,
            updated_at: None,
        }
    }

    pub fn image_path(&self) -> Option<&str> {
        self.last_image_path.as_deref()
    }

    pub fn visuals(&self) -> &[String] {
        &self.last_generated_visuals
    }

    pub fn video_url(&self) -> Option<&str> {
        self.last_video_url.as_deref()
    }

    pub fn stage(&self) -> WorkflowStage {
        if self.last_video_url.is_some() {
            WorkflowStage::VideoReady
        } else if !self.last_generated_visuals.is_empty() {
            WorkflowStage::VisualsReady
        } else if self.last_image_path.is_some() {
            WorkflowStage::MetadataReady
        } else {
            WorkflowStage::Idle
        }
    }

    pub fn can_generate_visuals(&self) -> bool {
        self.last_image_path.is_some()
    }

    pub fn can_generate_video(&self) -> bool {
        !self.last_generated_visuals.is_empty()
    }

    /// Store a fresh upload. Later steps keep their results until they are
    /// regenerated.
    pub fn record_image(&mut self, image_path: String) {
        self.last_image_path = Some(image_path);
        self.touch();
    }

    pub fn record_visuals(&mut self, visuals: Vec<String>) {
        self.last_generated_visuals = visuals;
        self.touch();
    }

    pub fn record_video(&mut self, video_url: String) {
        self.last_video_url = Some(video_url);
        self.touch();
    }

    pub fn visuals_request(&self, title: &str) -> Result<VisualsRequest, StudioError> {
        let image_path = self.last_image_path.clone().ok_or(StudioError::NoImage)?;
        Ok(VisualsRequest {
            image_path,
            title: title.to_string(),
        })
    }

    pub fn video_request(&self, fps: u32, tts: &str) -> Result<VideoRequest, StudioError> {
        if self.last_generated_visuals.is_empty() {
            return Err(StudioError::NoVisuals);
        }
        Ok(VideoRequest {
            frames: self.last_generated_visuals.clone(),
            fps,
            tts: tts.to_string(),
        })
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
