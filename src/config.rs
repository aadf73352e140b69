// config.rs - Runtime settings read from the environment
use std::time::Duration;

use url::Url;

use crate::error::StudioError;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_TOAST_MS: u64 = 3500;
pub const DEFAULT_VIDEO_FPS: u32 = 2;

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub backend_url: Url,
    pub toast_timeout: Duration,
    pub video_fps: u32,
    /// `None` means requests may wait indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            backend_url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid"),
            toast_timeout: Duration::from_millis(DEFAULT_TOAST_MS),
            video_fps: DEFAULT_VIDEO_FPS,
            request_timeout: None,
        }
    }
}

impl StudioConfig {
    /// Build the configuration from `STUDIO_*` environment variables.
    pub fn from_env() -> Result<Self, StudioError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, StudioError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend_url = match read("STUDIO_BACKEND_URL") {
            Some(raw) => Url::parse(&raw)
                .map_err(|e| StudioError::Config(format!("STUDIO_BACKEND_URL `{}`: {}", raw, e)))?,
            None => Url::parse(DEFAULT_BACKEND_URL)?,
        };

        let toast_ms = parse_number("STUDIO_TOAST_MS", read("STUDIO_TOAST_MS"), DEFAULT_TOAST_MS)?;

        let video_fps = parse_number("STUDIO_VIDEO_FPS", read("STUDIO_VIDEO_FPS"), DEFAULT_VIDEO_FPS)?;
        if video_fps == 0 {
            return Err(StudioError::Config("STUDIO_VIDEO_FPS must be at least 1".to_string()));
        }

        let request_timeout = match read("STUDIO_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = parse_number("STUDIO_REQUEST_TIMEOUT_SECS", Some(raw), 0)?;
                if secs == 0 {
                    return Err(StudioError::Config(
                        "STUDIO_REQUEST_TIMEOUT_SECS must be at least 1 (unset it to disable the timeout)"
                            .to_string(),
                    ));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            backend_url,
            toast_timeout: Duration::from_millis(toast_ms),
            video_fps,
            request_timeout,
        })
    }
}

fn parse_number<T>(key: &str, raw: Option<String>, default: T) -> Result<T, StudioError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .parse()
            .map_err(|e| StudioError::Config(format!("{} `{}`: {}", key, raw, e))),
        None => Ok(default),
    }
}
