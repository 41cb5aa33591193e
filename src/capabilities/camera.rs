use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::MAX_FRAME_BYTES;

pub struct Camera<Ev> {
    context: CapabilityContext<CameraOperation, Ev>,
}

impl<Ev> Capability<Ev> for Camera<Ev> {
    type Operation = CameraOperation;
    type MappedSelf<MappedEv> = Camera<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Camera::new(self.context.map_event(f))
    }
}

impl<Ev> Camera<Ev> {
    pub fn new(context: CapabilityContext<CameraOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Camera<Ev>
where
    Ev: Send + 'static,
{
    pub fn open<F>(&self, make_event: F)
    where
        F: Fn(CameraResult) -> Ev + Send + Sync + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(CameraOperation::Open).await;
            context.update_app(make_event(result));
        });
    }

    pub fn capture_frame<F>(&self, make_event: F)
    where
        F: Fn(CameraResult) -> Ev + Send + Sync + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(CameraOperation::CaptureFrame)
                .await;
            context.update_app(make_event(result));
        });
    }

    pub fn close(&self) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(CameraOperation::Close).await;
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraOperation {
    Open,
    CaptureFrame,
    Close,
}

impl Operation for CameraOperation {
    type Output = CameraResult;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraOutput {
    Opened,
    Frame(CapturedFrame),
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapturedFrame {
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
    pub format: FrameFormat,
    pub width: u32,
    pub height: u32,
}

impl CapturedFrame {
    /// Shells do not always declare the format they actually deliver, so the
    /// format is rederived from the magic bytes here.
    pub fn validated(mut self) -> Result<Self, CameraError> {
        if self.data.is_empty() {
            return Err(CameraError::EmptyFrame);
        }

        if self.data.len() > MAX_FRAME_BYTES {
            return Err(CameraError::FrameTooLarge {
                size: self.data.len(),
            });
        }

        match FrameFormat::from_magic_bytes(&self.data) {
            Some(format) => {
                self.format = format;
                Ok(self)
            }
            None => Err(CameraError::UnsupportedFormat),
        }
    }

    pub fn file_name(&self) -> String {
        format!("frame.{}", self.format.extension())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    Jpeg,
    Png,
    Webp,
}

impl FrameFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            FrameFormat::Jpeg => "image/jpeg",
            FrameFormat::Png => "image/png",
            FrameFormat::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FrameFormat::Jpeg => "jpg",
            FrameFormat::Png => "png",
            FrameFormat::Webp => "webp",
        }
    }

    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(FrameFormat::Jpeg);
        }

        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(FrameFormat::Png);
        }

        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(FrameFormat::Webp);
        }

        None
    }
}

impl Default for FrameFormat {
    fn default() -> Self {
        FrameFormat::Jpeg
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera device available")]
    NoDevice,

    #[error("camera is in use by another application")]
    Busy,

    #[error("frame contained no data")]
    EmptyFrame,

    #[error("frame too large: {size} bytes")]
    FrameTooLarge { size: usize },

    #[error("frame is not a recognised image format")]
    UnsupportedFormat,

    #[error("camera failed: {reason}")]
    Failed { reason: String },
}

impl CameraError {
    pub fn is_permission_error(&self) -> bool {
        matches!(self, CameraError::PermissionDenied)
    }
}

pub type CameraResult = Result<CameraOutput, CameraError>;
