use serde::{Deserialize, Serialize};

use crate::alert::{Alert, AlertId, AlertType};
use crate::api::{ApiResult, PurgeAck, SubmissionOutcome};
use crate::capabilities::{CameraResult, CapturedFrame, LocationResult};
use crate::feed::{SortKey, TypeFilter};
use crate::model::Screen;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Navigation & configuration
    ScreenChanged(Screen),
    EndpointConfigured {
        base_url: String,
    },

    // Alert feed
    RefreshRequested,
    AlertsFetched {
        seq: u64,
        result: ApiResult<Vec<Alert>>,
    },
    AlertSelected(AlertId),
    SelectionCleared,
    SortKeyChanged(SortKey),
    SortOrderToggled,
    TypeFilterChanged(TypeFilter),
    PageSelected(usize),

    // Seen tracking
    MarkAllSeenRequested,
    MarkAllSeenAcked(ApiResult<()>),
    MarkSeenAcked {
        id: AlertId,
        result: ApiResult<()>,
    },

    // Deletion
    DeleteRequested(AlertId),
    DeleteAcked {
        id: AlertId,
        result: ApiResult<()>,
    },

    // Admin bulk delete
    PurgeDialogOpened,
    PurgeDialogClosed,
    PurgeTypeChanged(Option<AlertType>),
    PurgeMinConfidenceChanged(String),
    PurgeMaxConfidenceChanged(String),
    PurgeTimeRangeChanged {
        from: String,
        to: String,
    },
    PurgeRequested,
    PurgeAcked(ApiResult<PurgeAck>),

    // Manual upload
    MediaStaged {
        file_name: String,
        #[serde(with = "serde_bytes")]
        data: Vec<u8>,
    },
    MediaCleared,
    UploadRequested,
    UploadPositionFixed(LocationResult),
    UploadCompleted(ApiResult<SubmissionOutcome>),

    // Webcam capture loop
    WebcamToggled,
    CameraOpened(CameraResult),
    CaptureTicked,
    FrameCaptured(CameraResult),
    FramePositionFixed {
        frame: CapturedFrame,
        result: LocationResult,
    },
    FrameSubmitted(ApiResult<SubmissionOutcome>),
    CriticalPromptDismissed,

    // Notifications
    NotificationDismissed(u64),
    NotificationExpired(u64),
}

impl Event {
    /// Stable name for tracing and effect logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Event::ScreenChanged(_) => "screen_changed",
            Event::EndpointConfigured { .. } => "endpoint_configured",
            Event::RefreshRequested => "refresh_requested",
            Event::AlertsFetched { .. } => "alerts_fetched",
            Event::AlertSelected(_) => "alert_selected",
            Event::SelectionCleared => "selection_cleared",
            Event::SortKeyChanged(_) => "sort_key_changed",
            Event::SortOrderToggled => "sort_order_toggled",
            Event::TypeFilterChanged(_) => "type_filter_changed",
            Event::PageSelected(_) => "page_selected",
            Event::MarkAllSeenRequested => "mark_all_seen_requested",
            Event::MarkAllSeenAcked(_) => "mark_all_seen_acked",
            Event::MarkSeenAcked { .. } => "mark_seen_acked",
            Event::DeleteRequested(_) => "delete_requested",
            Event::DeleteAcked { .. } => "delete_acked",
            Event::PurgeDialogOpened => "purge_dialog_opened",
            Event::PurgeDialogClosed => "purge_dialog_closed",
            Event::PurgeTypeChanged(_) => "purge_type_changed",
            Event::PurgeMinConfidenceChanged(_) => "purge_min_confidence_changed",
            Event::PurgeMaxConfidenceChanged(_) => "purge_max_confidence_changed",
            Event::PurgeTimeRangeChanged { .. } => "purge_time_range_changed",
            Event::PurgeRequested => "purge_requested",
            Event::PurgeAcked(_) => "purge_acked",
            Event::MediaStaged { .. } => "media_staged",
            Event::MediaCleared => "media_cleared",
            Event::UploadRequested => "upload_requested",
            Event::UploadPositionFixed(_) => "upload_position_fixed",
            Event::UploadCompleted(_) => "upload_completed",
            Event::WebcamToggled => "webcam_toggled",
            Event::CameraOpened(_) => "camera_opened",
            Event::CaptureTicked => "capture_ticked",
            Event::FrameCaptured(_) => "frame_captured",
            Event::FramePositionFixed { .. } => "frame_position_fixed",
            Event::FrameSubmitted(_) => "frame_submitted",
            Event::CriticalPromptDismissed => "critical_prompt_dismissed",
            Event::NotificationDismissed(_) => "notification_dismissed",
            Event::NotificationExpired(_) => "notification_expired",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_size_stays_small() {
        let size = std::mem::size_of::<Event>();
        assert!(
            size <= 128,
            "Event is {size} bytes; box the large variants"
        );
    }
}
