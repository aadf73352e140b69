// src/workflow/controller.rs
//! Drives the three-step listing workflow.
//!
//! Each step reports progress and failures to the view itself, then returns
//! the outcome so a caller can decide whether to continue. State only moves
//! forward after a successful backend response.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::api_client::StudioBackend;
use crate::config::StudioConfig;
use crate::error::StudioError;
use crate::types::{MetadataResponse, UploadForm};
use crate::view::{StatusTone, Trigger, VideoPreview, WorkflowView};
use crate::workflow::gallery::{gallery_items, GalleryItem};
use crate::workflow::lightbox::{Lightbox, LightboxClick, LightboxImage};
use crate::workflow::state::WorkflowState;

/// Visual title used when no category was entered.
pub const DEFAULT_TITLE: &str = "Product";

/// Narration subject used when no category was entered.
pub const DEFAULT_NARRATION_SUBJECT: &str = "A fine product";

pub struct WorkflowController<B, V> {
    backend: B,
    view: V,
    state: WorkflowState,
    lightbox: Lightbox,
    category: Option<String>,
    metadata_text: Option<String>,
    toast_timeout: Duration,
    video_fps: u32,
}

impl<B: StudioBackend, V: WorkflowView> WorkflowController<B, V> {
    pub fn new(backend: B, view: V) -> Self {
        Self::with_config(backend, view, &StudioConfig::default())
    }

    pub fn with_config(backend: B, mut view: V, config: &StudioConfig) -> Self {
        view.set_trigger_enabled(Trigger::Submit, true);
        view.set_trigger_enabled(Trigger::GenerateVisuals, false);
        view.set_trigger_enabled(Trigger::GenerateVideo, false);

        Self {
            backend,
            view,
            state: WorkflowState::new(),
            lightbox: Lightbox::new(),
            category: None,
            metadata_text: None,
            toast_timeout: config.toast_timeout,
            video_fps: config.video_fps,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Mirror of the category field; read when visuals and video are requested.
    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Upload the image and request listing metadata.
    pub async fn submit_upload(&mut self, form: UploadForm) -> Result<MetadataResponse, StudioError> {
        self.set_category(form.category().map(str::to_string));
        self.begin(Trigger::Submit, "Uploading image & generating metadata...");

        let result = self.backend.generate_metadata(&form).await;
        self.finish(Trigger::Submit);

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                return Err(self.fail("Failed to generate metadata", "Metadata failed", e));
            }
        };

        let missing = response.missing_required();
        if !missing.is_empty() {
            warn!("Metadata is missing listing fields: {:?}", missing);
        }

        info!("📝 Metadata generated for {}", response.image_path);
        self.state.record_image(response.image_path.clone());

        let rendered = response.pretty();
        self.view.render_metadata(&rendered);
        self.metadata_text = Some(rendered);

        self.view.set_trigger_enabled(Trigger::GenerateVisuals, true);
        self.toast("Metadata generated");
        self.view.set_status("Metadata generated ✅", StatusTone::Success);

        Ok(response)
    }

    /// Request supplementary visuals for the stored image.
    pub async fn generate_visuals(&mut self) -> Result<Vec<GalleryItem>, StudioError> {
        let title = self.category.as_deref().unwrap_or(DEFAULT_TITLE).to_string();
        let request = match self.state.visuals_request(&title) {
            Ok(request) => request,
            Err(e) => return Err(self.block("No image available to generate visuals", "No uploaded image", e)),
        };

        self.begin(Trigger::GenerateVisuals, "Generating supplementary visuals...");
        let result = self.backend.generate_visuals(&request).await;
        self.finish(Trigger::GenerateVisuals);

        let generated = match result {
            Ok(response) => response.generated,
            Err(e) => return Err(self.fail("Failed to generate visuals", "Visuals failed", e)),
        };

        info!("🖼️ {} visuals ready", generated.len());
        let items = gallery_items(&generated);
        self.state.record_visuals(generated);
        self.view.render_gallery(&items);

        if self.state.can_generate_video() {
            self.view.set_trigger_enabled(Trigger::GenerateVideo, true);
        }
        self.toast("Visuals ready");
        self.view.set_status("Visuals ready ✅", StatusTone::Success);

        Ok(items)
    }

    /// Request a slideshow of the generated visuals with narration.
    pub async fn generate_video(&mut self) -> Result<VideoPreview, StudioError> {
        let subject = self.category.as_deref().unwrap_or(DEFAULT_NARRATION_SUBJECT);
        let narration = format!("Introducing this product: {}", subject);
        let request = match self.state.video_request(self.video_fps, &narration) {
            Ok(request) => request,
            Err(e) => return Err(self.block("No visuals available", "No visuals", e)),
        };

        self.begin(Trigger::GenerateVideo, "Building slideshow video (ffmpeg required)...");
        let result = self.backend.generate_video(&request).await;
        self.finish(Trigger::GenerateVideo);

        let video_url = match result {
            Ok(response) => response.video_url,
            Err(e) => return Err(self.fail("Failed to build video", "Video failed", e)),
        };

        info!("🎬 Video ready at {}", video_url);
        let preview = VideoPreview::new(video_url.clone());
        self.state.record_video(video_url);
        self.view.show_video(&preview);
        self.toast("Video ready");
        self.view.set_status("Video ready ✅", StatusTone::Success);

        Ok(preview)
    }

    /// Open the lightbox on a gallery entry. Out-of-range indexes do nothing.
    pub fn open_visual(&mut self, index: usize) -> Option<LightboxImage> {
        let item = gallery_items(self.state.visuals()).into_iter().nth(index)?;
        let image = self.lightbox.open(&item.src).clone();
        self.view.show_lightbox(Some(&image));
        Some(image)
    }

    pub fn lightbox_click(&mut self, target: LightboxClick) {
        if self.lightbox.click(target) {
            self.view.show_lightbox(None);
        }
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    /// Copy the rendered metadata. Clipboard failures are ignored.
    pub fn copy_metadata(&mut self) -> bool {
        let Some(text) = self.metadata_text.clone() else {
            return false;
        };

        match self.view.copy_to_clipboard(&text) {
            Ok(()) => {
                self.toast("Metadata copied to clipboard");
                true
            }
            Err(e) => {
                debug!("clipboard copy skipped: {}", e);
                false
            }
        }
    }

    fn begin(&mut self, trigger: Trigger, status: &str) {
        self.view.set_status(status, StatusTone::Info);
        self.view.set_trigger_enabled(trigger, false);
        self.view.set_loading(true);
    }

    fn finish(&mut self, trigger: Trigger) {
        self.view.set_trigger_enabled(trigger, true);
        self.view.set_loading(false);
    }

    fn toast(&mut self, message: &str) {
        self.view.show_toast(message, self.toast_timeout);
    }

    fn fail(&mut self, status: &str, toast: &str, e: StudioError) -> StudioError {
        error!("{}: {}", status, e);
        self.view
            .set_status(&format!("{}: {}", status, e), StatusTone::Error);
        self.toast(toast);
        e
    }

    fn block(&mut self, status: &str, toast: &str, e: StudioError) -> StudioError {
        warn!("{}", status);
        self.view.set_status(status, StatusTone::Error);
        self.toast(toast);
        e
    }
}
