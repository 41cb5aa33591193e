use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::alert::Alert;
use crate::feed::{UnseenSet, ViewState};
use crate::filter::Filter;
use crate::notifications::NotificationQueue;
use crate::DEFAULT_API_BASE;

/// Where alert traffic goes. The base URL is kept without a trailing slash so
/// endpoint paths can be appended directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn set_base_url(&mut self, raw: &str) -> Result<(), ConfigError> {
        let trimmed = raw.trim().trim_end_matches('/');
        let url = Url::parse(trimmed).map_err(|e| ConfigError::Unparseable {
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            _ => return Err(ConfigError::UnsupportedScheme),
        }

        if url.host_str().is_none() {
            return Err(ConfigError::MissingHost);
        }

        self.base_url = trimmed.to_string();
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an absolute URL for a server path. Accepts paths with or
    /// without a leading slash, since stored image paths come without one.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("not a valid URL: {reason}")]
    Unparseable { reason: String },

    #[error("URL scheme must be http or https")]
    UnsupportedScheme,

    #[error("URL has no host")]
    MissingHost,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Home,
    Upload,
    Webcam,
    Admin,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WebcamPhase {
    #[default]
    Off,
    Starting,
    Running,
}

/// A file the user picked for manual submission, held until they confirm the
/// upload.
#[derive(Clone, PartialEq, Eq)]
pub struct StagedMedia {
    pub file_name: String,
    pub data: Vec<u8>,
}

// Keep raw image bytes out of debug output.
impl fmt::Debug for StagedMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedMedia")
            .field("file_name", &self.file_name)
            .field("len", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: ApiConfig,
    pub screen: Screen,

    // Alert feed
    pub alerts: Vec<Alert>,
    pub unseen: UnseenSet,
    pub view: ViewState,
    pub fetch_seq: u64,
    pub refreshing: bool,

    // Admin bulk delete dialog
    pub purge_dialog: Option<Filter>,

    // Manual upload
    pub staged_media: Option<StagedMedia>,
    pub upload_in_progress: bool,

    // Webcam capture loop
    pub webcam: WebcamPhase,
    pub in_flight_uploads: usize,

    /// The alert behind the blocking critical prompt, when one is raised.
    pub critical_prompt: Option<Box<Alert>>,

    pub notifications: NotificationQueue,
}
