// src/view/console.rs
//! Terminal renderer for the workflow.
//!
//! When the writer is a terminal, clipboard copies try OSC 52 first (works
//! over SSH) and fall back to the system clipboard via `arboard`. Piped or
//! redirected output goes straight to `arboard` so no escape bytes leak
//! into it.

use std::io::Write;
use std::time::Duration;

use base64::Engine;
use tracing::debug;
use url::Url;

use super::{ClipboardError, StatusTone, Trigger, TriggerStates, VideoPreview, WorkflowView};
use crate::api_client::resolve_against;
use crate::workflow::{GalleryItem, LightboxImage};

pub struct ConsoleView<W: Write> {
    out: W,
    base_url: Url,
    triggers: TriggerStates,
    loading: bool,
    clipboard_enabled: bool,
    terminal: bool,
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W, base_url: Url) -> Self {
        Self {
            out,
            base_url,
            triggers: TriggerStates::default(),
            loading: false,
            clipboard_enabled: true,
            terminal: false,
        }
    }

    /// Whether `out` is an interactive terminal that understands OSC 52.
    pub fn with_terminal(mut self, terminal: bool) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn without_clipboard(mut self) -> Self {
        self.clipboard_enabled = false;
        self
    }

    pub fn is_enabled(&self, trigger: Trigger) -> bool {
        self.triggers.is_enabled(trigger)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Absolute link for a backend web path; falls back to the raw path.
    fn link(&self, path: &str) -> String {
        resolve_against(&self.base_url, path)
            .map(String::from)
            .unwrap_or_else(|_| path.to_string())
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            debug!("console write failed: {}", e);
        }
    }

    fn copy_osc52(&mut self, text: &str) -> Result<(), ClipboardError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(text);

        // ESC ] 52 ; c ; <base64> ESC \
        write!(self.out, "\x1b]52;c;{}\x1b\\", encoded)
            .map_err(|e| ClipboardError::Osc52(e.to_string()))?;
        self.out
            .flush()
            .map_err(|e| ClipboardError::Osc52(e.to_string()))?;

        Ok(())
    }

    fn copy_system(text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::System(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::System(e.to_string()))?;
        Ok(())
    }
}

impl<W: Write> WorkflowView for ConsoleView<W> {
    fn set_status(&mut self, message: &str, tone: StatusTone) {
        let tag = match tone {
            StatusTone::Info => "info",
            StatusTone::Success => "ok",
            StatusTone::Error => "error",
        };
        self.line(&format!("[{}] {}", tag, message));
    }

    fn show_toast(&mut self, message: &str, _timeout: Duration) {
        self.line(&format!("» {}", message));
    }

    fn set_loading(&mut self, loading: bool) {
        if loading && !self.loading {
            self.line("⏳ working...");
        }
        self.loading = loading;
    }

    fn set_trigger_enabled(&mut self, trigger: Trigger, enabled: bool) {
        debug!(trigger = trigger.label(), enabled, "trigger state changed");
        self.triggers.set(trigger, enabled);
    }

    fn render_metadata(&mut self, pretty_json: &str) {
        self.line("── Metadata ──");
        self.line(pretty_json);
    }

    fn render_gallery(&mut self, items: &[GalleryItem]) {
        self.line("── Visuals ──");
        for item in items {
            let link = self.link(&item.src);
            self.line(&format!("{}: {}", item.caption, link));
        }
    }

    fn show_video(&mut self, preview: &VideoPreview) {
        let url = self.link(&preview.url);
        let download = self.link(&preview.download_href);
        self.line("── Video ──");
        self.line(&format!("Preview: {}", url));
        self.line(&format!("Download video: {}", download));
    }

    fn show_lightbox(&mut self, image: Option<&LightboxImage>) {
        match image {
            Some(image) => {
                let src = self.link(&image.src);
                let download = self.link(&image.download_href);
                self.line(&format!("Viewing {} (download: {})", src, download));
            }
            None => self.line("Closed preview"),
        }
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<(), ClipboardError> {
        if !self.clipboard_enabled {
            return Err(ClipboardError::Disabled);
        }
        if self.terminal && self.copy_osc52(text).is_ok() {
            return Ok(());
        }
        Self::copy_system(text)
    }
}
