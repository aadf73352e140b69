// Workflow module - the upload → visuals → video pipeline and its UI state
pub mod state;
pub mod gallery;
pub mod lightbox;
pub mod controller;

pub use controller::WorkflowController;
pub use gallery::{gallery_items, GalleryItem};
pub use lightbox::{Lightbox, LightboxClick, LightboxImage};
pub use state::{WorkflowStage, WorkflowState};
