// lib.rs - Client for the product listing studio backend
pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod api_client;
pub mod workflow;
pub mod view;

// Re-export commonly used types for convenience
pub use api_client::{StudioBackend, StudioClient};
pub use config::StudioConfig;
pub use error::StudioError;
pub use types::*;
pub use view::{ConsoleView, StatusTone, Trigger, VideoPreview, WorkflowView};
pub use workflow::{WorkflowController, WorkflowStage, WorkflowState};
