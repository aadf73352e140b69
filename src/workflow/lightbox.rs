// Lightbox overlay for a single generated visual

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightboxImage {
    pub src: String,
    pub download_href: String,
}

/// Where a click inside the open overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxClick {
    CloseButton,
    /// The dimmed area around the image
    Backdrop,
    /// The image or its download link
    Content,
}

#[derive(Debug, Clone, Default)]
pub struct Lightbox {
    current: Option<LightboxImage>,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, src: &str) -> &LightboxImage {
        self.current.insert(LightboxImage {
            src: src.to_string(),
            download_href: src.to_string(),
        })
    }

    /// Returns true when the click closed the overlay.
    pub fn click(&mut self, target: LightboxClick) -> bool {
        if self.current.is_none() {
            return false;
        }
        match target {
            LightboxClick::CloseButton | LightboxClick::Backdrop => {
                self.current = None;
                true
            }
            LightboxClick::Content => false,
        }
    }

    pub fn current(&self) -> Option<&LightboxImage> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }
}
