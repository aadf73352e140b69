//! Rendering surface for the workflow.
//!
//! The controller never touches a concrete UI; it drives a [`WorkflowView`],
//! which a terminal renderer ([`ConsoleView`]) or any other front end implements.

use std::time::Duration;

use thiserror::Error;

use crate::workflow::{GalleryItem, LightboxImage};

pub mod console;

pub use console::ConsoleView;

/// Colour of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Info,
    Success,
    Error,
}

/// Controls that start a backend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Submit,
    GenerateVisuals,
    GenerateVideo,
}

impl Trigger {
    pub fn label(self) -> &'static str {
        match self {
            Trigger::Submit => "Generate metadata",
            Trigger::GenerateVisuals => "Generate visuals",
            Trigger::GenerateVideo => "Generate video",
        }
    }

    fn slot(self) -> usize {
        match self {
            Trigger::Submit => 0,
            Trigger::GenerateVisuals => 1,
            Trigger::GenerateVideo => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPreview {
    pub url: String,
    pub download_href: String,
}

impl VideoPreview {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            download_href: url.clone(),
            url,
        }
    }
}

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("OSC 52 clipboard failed: {0}")]
    Osc52(String),
    #[error("System clipboard failed: {0}")]
    System(String),
    #[error("Clipboard is disabled")]
    Disabled,
}

pub trait WorkflowView {
    fn set_status(&mut self, message: &str, tone: StatusTone);

    /// Transient notification, hidden again after `timeout`.
    fn show_toast(&mut self, message: &str, timeout: Duration);

    fn set_loading(&mut self, loading: bool);

    fn set_trigger_enabled(&mut self, trigger: Trigger, enabled: bool);

    /// Show the metadata card with the pretty-printed payload.
    fn render_metadata(&mut self, pretty_json: &str);

    /// Replace the gallery contents.
    fn render_gallery(&mut self, items: &[GalleryItem]);

    fn show_video(&mut self, preview: &VideoPreview);

    /// `None` hides the overlay.
    fn show_lightbox(&mut self, image: Option<&LightboxImage>);

    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Enabled flags for each [`Trigger`]. Nothing but the submit control is
/// usable before the first upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerStates([bool; 3]);

impl Default for TriggerStates {
    fn default() -> Self {
        Self([true, false, false])
    }
}

impl TriggerStates {
    pub fn is_enabled(&self, trigger: Trigger) -> bool {
        self.0[trigger.slot()]
    }

    pub fn set(&mut self, trigger: Trigger, enabled: bool) {
        self.0[trigger.slot()] = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_trigger_states() {
        let states = TriggerStates::default();
        assert!(states.is_enabled(Trigger::Submit));
        assert!(!states.is_enabled(Trigger::GenerateVisuals));
        assert!(!states.is_enabled(Trigger::GenerateVideo));
    }

    #[test]
    fn test_video_preview_links_download() {
        let preview = VideoPreview::new("/outputs/videos/v.mp4");
        assert_eq!(preview.download_href, preview.url);
    }
}
