//! The application core: one `update` loop over [`Event`], one pure `view`.
//!
//! Shells render the [`ViewModel`] and resolve the effects; nothing in here
//! touches a network, camera or clock directly.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::alert::{Alert, AlertId, AlertType, LatLon};
use crate::api::{self, SubmissionOutcome, TransportError};
use crate::capabilities::{CameraOutput, Capabilities, FrameFormat, GeoFix};
use crate::event::Event;
use crate::feed::{self, SortKey, SortOrder, TypeFilter, ViewState};
use crate::filter::Filter;
use crate::heatmap::{self, HeatPoint};
use crate::model::{Model, Screen, StagedMedia, WebcamPhase};
use crate::notifications::{Notification, Severity};
use crate::{CAPTURE_PERIOD_MS, MAX_IN_FLIGHT_UPLOADS, NOTIFICATION_TTL_MS};

#[derive(Default)]
pub struct App;

/// One alert as a screen shows it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AlertRow {
    pub id: AlertId,
    pub alert_type: AlertType,
    pub label: String,
    pub confidence_pct: f64,
    pub image: String,
    pub gps: Option<String>,
    pub gps_url: Option<String>,
    pub timestamp: String,
    pub unseen: bool,
}

impl AlertRow {
    fn from_alert(alert: &Alert, unseen: bool) -> Self {
        Self {
            id: alert.id.clone(),
            alert_type: alert.alert_type,
            label: alert.label.clone(),
            confidence_pct: alert.confidence_pct(),
            image: alert.image.clone(),
            gps: alert.gps.clone(),
            gps_url: alert.gps_url.clone(),
            timestamp: alert.display_timestamp().to_string(),
            unseen,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PurgeDialogView {
    pub filter: Filter,
    /// How many currently loaded alerts the filter would delete.
    pub match_count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub screen: Screen,
    pub refreshing: bool,

    // Alert feed
    pub feed: Vec<AlertRow>,
    pub page: Vec<AlertRow>,
    pub current_page: usize,
    pub page_count: usize,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub type_filter: TypeFilter,
    pub selected: Option<AlertRow>,
    pub unseen_count: usize,
    pub heat_points: Vec<HeatPoint>,

    // Manual upload
    pub staged_file: Option<String>,
    pub uploading: bool,

    // Webcam capture loop
    pub webcam: WebcamPhase,
    pub critical_alert: Option<AlertRow>,

    pub purge_dialog: Option<PurgeDialogView>,
    pub notifications: Vec<Notification>,
}

impl App {
    /// Issues a sequence-tagged list fetch. Only the response matching the
    /// latest issued sequence is ever applied.
    fn fetch_alerts(model: &mut Model, caps: &Capabilities) {
        model.fetch_seq += 1;
        model.refreshing = true;
        let seq = model.fetch_seq;
        api::list_alerts(&caps.http, &model.config, move |result| {
            Event::AlertsFetched { seq, result }
        });
    }

    fn notify(model: &mut Model, caps: &Capabilities, message: impl Into<String>, severity: Severity) {
        let id = model.notifications.push(message, severity, false);
        caps.timer.delay(NOTIFICATION_TTL_MS, Event::NotificationExpired(id));
    }

    fn notify_sticky(model: &mut Model, message: impl Into<String>, severity: Severity) {
        model.notifications.push(message, severity, true);
    }

    fn surface_transport_error(
        model: &mut Model,
        caps: &Capabilities,
        prefix: &str,
        error: &TransportError,
    ) {
        tracing::error!(%error, "{prefix}");
        Self::notify(model, caps, format!("{prefix}: {error}"), Severity::Error);
    }

    /// Shared handling for a submission response that carries an alert:
    /// branch on the class, then acknowledge and reload.
    fn apply_detection(
        model: &mut Model,
        caps: &Capabilities,
        alert: Box<Alert>,
        alert_message: &str,
        success_message: &str,
    ) {
        match alert.alert_type {
            AlertType::Critical => {
                model.critical_prompt = Some(alert);
            }
            AlertType::Alert => {
                Self::notify_sticky(model, alert_message, Severity::Warning);
            }
            AlertType::FalsePositive => {
                Self::notify_sticky(model, "False positive", Severity::Muted);
            }
            AlertType::Unknown => {
                debug!(id = %alert.id, "response carried an unclassified alert");
            }
        }
        Self::notify(model, caps, success_message, Severity::Success);
        Self::fetch_alerts(model, caps);
    }

    fn validated_fix(fix: GeoFix) -> Option<LatLon> {
        LatLon::new(fix.lat, fix.lon)
    }

    /// Content type for user-picked media, sniffed from the payload since
    /// file extensions lie.
    fn media_mime(data: &[u8]) -> &'static str {
        FrameFormat::from_magic_bytes(data)
            .map_or("application/octet-stream", |format| format.mime())
    }

    fn stop_webcam(model: &mut Model, caps: &Capabilities) {
        if model.webcam != WebcamPhase::Off {
            model.webcam = WebcamPhase::Off;
            caps.camera.close();
        }
    }

    fn leave_screen(model: &mut Model, caps: &Capabilities) {
        Self::stop_webcam(model, caps);
        model.view = ViewState::default();
        model.notifications.clear();
        model.staged_media = None;
        model.upload_in_progress = false;
        model.purge_dialog = None;
        model.critical_prompt = None;
        // In-flight uploads are not cancelled; their late responses are
        // dropped by the screen guard instead.
        model.in_flight_uploads = 0;
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(event = event.name(), "update");

        match event {
            Event::ScreenChanged(screen) => {
                Self::leave_screen(model, caps);
                model.screen = screen;
                if screen != Screen::Home {
                    Self::fetch_alerts(model, caps);
                }
            }

            Event::EndpointConfigured { base_url } => {
                if let Err(e) = model.config.set_base_url(&base_url) {
                    warn!(%base_url, error = %e, "rejected endpoint override");
                    Self::notify(model, caps, format!("Invalid endpoint: {e}"), Severity::Warning);
                }
            }

            Event::RefreshRequested => {
                Self::fetch_alerts(model, caps);
            }

            Event::AlertsFetched { seq, result } => {
                if seq != model.fetch_seq {
                    debug!(seq, latest = model.fetch_seq, "discarding stale alert fetch");
                    return;
                }
                model.refreshing = false;
                match result {
                    Ok(alerts) => {
                        model.unseen = feed::UnseenSet::rebuild(&alerts);
                        model.alerts = alerts;
                    }
                    Err(e) => {
                        Self::surface_transport_error(model, caps, "Failed to load alerts", &e);
                    }
                }
            }

            Event::AlertSelected(id) => {
                if model.unseen.mark_seen(&id) {
                    let marked = id.clone();
                    api::mark_seen(&caps.http, &model.config, &id, move |result| {
                        Event::MarkSeenAcked {
                            id: marked.clone(),
                            result,
                        }
                    });
                }
                model.view.selected = Some(id);
            }

            Event::SelectionCleared => {
                model.view.selected = None;
            }

            Event::SortKeyChanged(key) => {
                model.view.set_sort_key(key);
            }

            Event::SortOrderToggled => {
                model.view.toggle_sort_order();
            }

            Event::TypeFilterChanged(filter) => {
                model.view.set_type_filter(filter);
            }

            Event::PageSelected(page) => {
                let shown = feed::filtered_count(&model.alerts, model.view.type_filter);
                let pages = feed::page_count(shown).max(1);
                if (1..=pages).contains(&page) {
                    model.view.current_page = page;
                } else {
                    debug!(page, pages, "ignoring out-of-range page selection");
                    return;
                }
            }

            Event::MarkAllSeenRequested => {
                model.unseen.clear();
                api::mark_all_seen(&caps.http, &model.config, Event::MarkAllSeenAcked);
            }

            Event::MarkAllSeenAcked(result) => match result {
                // The optimistic clear already happened; the reload brings
                // the collection back in line with the server.
                Ok(()) => {
                    if model.screen == Screen::Admin {
                        Self::fetch_alerts(model, caps);
                    }
                }
                Err(e) => {
                    Self::surface_transport_error(model, caps, "Failed to mark alerts seen", &e);
                }
            },

            Event::MarkSeenAcked { id, result } => {
                // Fire and forget: the next reload reconciles either way.
                if let Err(e) = result {
                    warn!(%id, error = %e, "mark-seen not acknowledged");
                }
                return;
            }

            Event::DeleteRequested(id) => {
                let Some(alert) = model.alerts.iter().find(|a| a.id == id) else {
                    debug!(%id, "delete requested for an alert not in the collection");
                    return;
                };
                let image = alert.image.clone();
                let deleted = id.clone();
                let sent = api::delete_alert(&caps.http, &model.config, &id, &image, move |result| {
                    Event::DeleteAcked {
                        id: deleted.clone(),
                        result,
                    }
                });
                if let Err(e) = sent {
                    Self::surface_transport_error(model, caps, "Failed to delete alert", &e);
                }
            }

            Event::DeleteAcked { id, result } => match result {
                Ok(()) => {
                    if model.view.selected.as_ref() == Some(&id) {
                        model.view.selected = None;
                    }
                    Self::notify(model, caps, "Alert deleted", Severity::Success);
                    Self::fetch_alerts(model, caps);
                }
                Err(e) => {
                    Self::surface_transport_error(model, caps, "Failed to delete alert", &e);
                }
            },

            Event::PurgeDialogOpened => {
                model.purge_dialog = Some(Filter::default());
            }

            Event::PurgeDialogClosed => {
                model.purge_dialog = None;
            }

            Event::PurgeTypeChanged(alert_type) => {
                if let Some(filter) = &mut model.purge_dialog {
                    filter.alert_type = alert_type;
                }
            }

            Event::PurgeMinConfidenceChanged(raw) => {
                if let Some(filter) = &mut model.purge_dialog {
                    filter.set_min_confidence_input(&raw);
                }
            }

            Event::PurgeMaxConfidenceChanged(raw) => {
                if let Some(filter) = &mut model.purge_dialog {
                    filter.set_max_confidence_input(&raw);
                }
            }

            Event::PurgeTimeRangeChanged { from, to } => {
                if let Some(filter) = &mut model.purge_dialog {
                    filter.set_time_range(from, to);
                }
            }

            Event::PurgeRequested => {
                let Some(filter) = model.purge_dialog.clone() else {
                    return;
                };
                let sent =
                    api::delete_by_filter(&caps.http, &model.config, &filter, Event::PurgeAcked);
                if let Err(e) = sent {
                    Self::surface_transport_error(model, caps, "Failed to delete alerts", &e);
                }
            }

            Event::PurgeAcked(result) => match result {
                Ok(ack) => {
                    model.purge_dialog = None;
                    Self::notify(
                        model,
                        caps,
                        format!("Deleted {} alerts", ack.deleted),
                        Severity::Success,
                    );
                    Self::fetch_alerts(model, caps);
                }
                Err(e) => {
                    Self::surface_transport_error(model, caps, "Failed to delete alerts", &e);
                }
            },

            Event::MediaStaged { file_name, data } => {
                Self::notify(
                    model,
                    caps,
                    format!("{file_name} selected successfully"),
                    Severity::Success,
                );
                model.staged_media = Some(StagedMedia { file_name, data });
            }

            Event::MediaCleared => {
                model.staged_media = None;
            }

            Event::UploadRequested => {
                if model.staged_media.is_none() {
                    Self::notify(model, caps, "No file selected", Severity::Warning);
                } else if model.upload_in_progress {
                    debug!("upload already in progress");
                    return;
                } else {
                    model.upload_in_progress = true;
                    caps.location.current_position(Event::UploadPositionFixed);
                }
            }

            Event::UploadPositionFixed(result) => {
                if !model.upload_in_progress {
                    return;
                }
                let position = match result {
                    Ok(fix) => Self::validated_fix(fix),
                    Err(e) => {
                        model.upload_in_progress = false;
                        Self::notify(model, caps, format!("GPS Error: {e}"), Severity::Error);
                        caps.render.render();
                        return;
                    }
                };
                let Some(position) = position else {
                    model.upload_in_progress = false;
                    Self::notify(
                        model,
                        caps,
                        "GPS Error: position out of range",
                        Severity::Error,
                    );
                    caps.render.render();
                    return;
                };
                // The file may have been cleared while the fix was pending;
                // the flag must drop either way or later uploads would be
                // swallowed by the in-progress guard.
                let Some(media) = &model.staged_media else {
                    model.upload_in_progress = false;
                    Self::notify(model, caps, "No file selected", Severity::Warning);
                    caps.render.render();
                    return;
                };
                api::create_alert(
                    &caps.http,
                    &model.config,
                    &media.file_name,
                    Self::media_mime(&media.data),
                    &media.data,
                    Some(position),
                    Event::UploadCompleted,
                );
            }

            Event::UploadCompleted(result) => {
                if model.screen != Screen::Upload {
                    return;
                }
                model.upload_in_progress = false;
                match result {
                    Ok(SubmissionOutcome { alert: Some(alert), .. }) => {
                        model.staged_media = None;
                        Self::apply_detection(
                            model,
                            caps,
                            alert,
                            "Alert generated",
                            "Upload successful",
                        );
                    }
                    Ok(SubmissionOutcome { alert: None, .. }) => {
                        model.staged_media = None;
                        Self::notify(model, caps, "No alert generated", Severity::Info);
                    }
                    // The staged file survives a failed upload so the user
                    // can retry without picking it again.
                    Err(e) => {
                        Self::surface_transport_error(model, caps, "Upload failed", &e);
                    }
                }
            }

            Event::WebcamToggled => match model.webcam {
                WebcamPhase::Off => {
                    model.webcam = WebcamPhase::Starting;
                    caps.camera.open(Event::CameraOpened);
                }
                WebcamPhase::Starting | WebcamPhase::Running => {
                    Self::stop_webcam(model, caps);
                }
            },

            Event::CameraOpened(result) => {
                if model.webcam != WebcamPhase::Starting {
                    // Toggled off while the permission prompt was up.
                    if result.is_ok() {
                        caps.camera.close();
                    }
                    return;
                }
                match result {
                    Ok(CameraOutput::Opened) => {
                        model.webcam = WebcamPhase::Running;
                        caps.timer.delay(CAPTURE_PERIOD_MS, Event::CaptureTicked);
                    }
                    Ok(other) => {
                        debug!(?other, "unexpected camera output while starting");
                        model.webcam = WebcamPhase::Off;
                        Self::notify(model, caps, "Webcam failed to start", Severity::Error);
                    }
                    Err(e) => {
                        model.webcam = WebcamPhase::Off;
                        Self::notify(model, caps, format!("Webcam error: {e}"), Severity::Error);
                    }
                }
            }

            Event::CaptureTicked => {
                if model.webcam != WebcamPhase::Running {
                    return;
                }
                // Fixed cadence: the next tick is armed before this one does
                // any work.
                caps.timer.delay(CAPTURE_PERIOD_MS, Event::CaptureTicked);
                if model.in_flight_uploads >= MAX_IN_FLIGHT_UPLOADS {
                    debug!(
                        in_flight = model.in_flight_uploads,
                        "skipping capture, uploads saturated"
                    );
                    return;
                }
                caps.camera.capture_frame(Event::FrameCaptured);
            }

            Event::FrameCaptured(result) => {
                if model.webcam != WebcamPhase::Running {
                    return;
                }
                let frame = match result {
                    Ok(CameraOutput::Frame(frame)) => frame.validated(),
                    Ok(other) => {
                        debug!(?other, "unexpected camera output for a capture");
                        Self::notify(model, caps, "No image captured", Severity::Error);
                        caps.render.render();
                        return;
                    }
                    Err(e) => Err(e),
                };
                match frame {
                    Ok(frame) => {
                        caps.location.current_position(move |result| {
                            Event::FramePositionFixed {
                                frame: frame.clone(),
                                result,
                            }
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "frame capture failed");
                        Self::notify(model, caps, "No image captured", Severity::Error);
                    }
                }
            }

            Event::FramePositionFixed { frame, result } => {
                if model.webcam != WebcamPhase::Running {
                    return;
                }
                let position = match result {
                    Ok(fix) => Self::validated_fix(fix),
                    Err(_) => None,
                };
                let Some(position) = position else {
                    // The frame is dropped, not queued; the next tick stands
                    // on its own.
                    Self::notify(model, caps, "GPS access failed", Severity::Error);
                    caps.render.render();
                    return;
                };
                model.in_flight_uploads += 1;
                api::submit_frame(
                    &caps.http,
                    &model.config,
                    &frame.file_name(),
                    frame.format.mime(),
                    &frame.data,
                    position,
                    Event::FrameSubmitted,
                );
            }

            Event::FrameSubmitted(result) => {
                model.in_flight_uploads = model.in_flight_uploads.saturating_sub(1);
                if model.screen != Screen::Webcam {
                    return;
                }
                match result {
                    Ok(SubmissionOutcome { alert: Some(alert), .. }) => {
                        Self::apply_detection(
                            model,
                            caps,
                            alert,
                            "Alert detected",
                            "Detection complete",
                        );
                    }
                    // No detection in this frame: a valid quiet outcome.
                    Ok(SubmissionOutcome { alert: None, .. }) => return,
                    Err(e) => {
                        Self::surface_transport_error(model, caps, "Failed to send frame", &e);
                    }
                }
            }

            Event::CriticalPromptDismissed => {
                model.critical_prompt = None;
            }

            Event::NotificationDismissed(id) => {
                if !model.notifications.dismiss(id) {
                    return;
                }
            }

            Event::NotificationExpired(id) => {
                if !model.notifications.expire(id) {
                    return;
                }
            }
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        let rows = feed::ordered(&model.alerts, &model.view);
        let feed: Vec<AlertRow> = rows
            .iter()
            .map(|a| AlertRow::from_alert(a, model.unseen.contains(&a.id)))
            .collect();

        let span = feed::paginate(feed.len(), model.view.current_page);
        let page = feed[span.start..span.end].to_vec();

        let selected = model.view.selected.as_ref().and_then(|id| {
            model
                .alerts
                .iter()
                .find(|a| &a.id == id)
                .map(|a| AlertRow::from_alert(a, model.unseen.contains(&a.id)))
        });

        let purge_dialog = model.purge_dialog.as_ref().map(|filter| PurgeDialogView {
            filter: filter.clone(),
            match_count: filter.match_count(&model.alerts),
        });

        ViewModel {
            screen: model.screen,
            refreshing: model.refreshing,
            feed,
            page,
            current_page: span.page,
            page_count: span.page_count,
            sort_by: model.view.sort_by,
            sort_order: model.view.sort_order,
            type_filter: model.view.type_filter,
            selected,
            unseen_count: model.unseen.len(),
            heat_points: heatmap::heat_points(&model.alerts),
            staged_file: model
                .staged_media
                .as_ref()
                .map(|m| m.file_name.clone()),
            uploading: model.upload_in_progress,
            webcam: model.webcam,
            critical_alert: model
                .critical_prompt
                .as_ref()
                .map(|a| AlertRow::from_alert(a, false)),
            purge_dialog,
            notifications: model.notifications.entries().to_vec(),
        }
    }
}
