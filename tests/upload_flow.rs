use crux_core::testing::AppTester;
use sar_core::alert::{Alert, AlertId, AlertType};
use sar_core::api::{SubmissionOutcome, TransportError};
use sar_core::capabilities::{GeoFix, LocationError};
use sar_core::model::Screen;
use sar_core::notifications::Severity;
use sar_core::{App, CruxApp, Effect, Event, Model};

// JPEG magic bytes followed by padding, enough to pass media sniffing.
fn media_bytes() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.extend_from_slice(&[0x00; 32]);
    data
}

fn detection(alert_type: AlertType) -> SubmissionOutcome {
    SubmissionOutcome {
        message: "Alert created".to_string(),
        alert: Some(Box::new(Alert {
            id: AlertId("det1".to_string()),
            alert_type,
            label: "person".to_string(),
            confidence: 0.88,
            image: "/uploads/det1.jpg".to_string(),
            gps: Some("24.7,46.6".to_string()),
            gps_url: None,
            timestamp: "2024-05-01T10:00:00".to_string(),
            seen: false,
        })),
    }
}

fn on_upload_screen(app: &AppTester<App, Effect>, model: &mut Model) {
    app.update(Event::ScreenChanged(Screen::Upload), model);
}

fn has_http(effects: &[Effect]) -> bool {
    effects.iter().any(|e| matches!(e, Effect::Http(_)))
}

#[test]
fn staging_a_file_notifies() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    on_upload_screen(&app, &mut model);

    app.update(
        Event::MediaStaged {
            file_name: "beach.jpg".to_string(),
            data: media_bytes(),
        },
        &mut model,
    );

    assert_eq!(App.view(&model).staged_file.as_deref(), Some("beach.jpg"));
    let note = &model.notifications.entries()[0];
    assert_eq!(note.severity, Severity::Success);
    assert!(note.message.contains("beach.jpg"));
}

#[test]
fn upload_with_nothing_staged_warns() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    on_upload_screen(&app, &mut model);

    let update = app.update(Event::UploadRequested, &mut model);

    assert!(!model.upload_in_progress);
    assert!(!update.effects.iter().any(|e| matches!(e, Effect::Location(_))));
    assert_eq!(model.notifications.entries()[0].severity, Severity::Warning);
}

#[test]
fn upload_asks_for_a_position_first() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    on_upload_screen(&app, &mut model);
    app.update(
        Event::MediaStaged {
            file_name: "beach.jpg".to_string(),
            data: media_bytes(),
        },
        &mut model,
    );

    let update = app.update(Event::UploadRequested, &mut model);
    assert!(model.upload_in_progress);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Location(_))));
    assert!(!has_http(&update.effects), "nothing uploads before the fix");
}

#[test]
fn geolocation_failure_aborts_the_upload() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    on_upload_screen(&app, &mut model);
    app.update(
        Event::MediaStaged {
            file_name: "beach.jpg".to_string(),
            data: media_bytes(),
        },
        &mut model,
    );
    app.update(Event::UploadRequested, &mut model);
    model.notifications.clear();

    let update = app.update(
        Event::UploadPositionFixed(Err(LocationError::PermissionDenied)),
        &mut model,
    );

    assert!(!model.upload_in_progress);
    assert!(!has_http(&update.effects));
    let note = &model.notifications.entries()[0];
    assert_eq!(note.severity, Severity::Error);
    assert!(note.message.starts_with("GPS Error"));
    assert!(model.staged_media.is_some(), "file stays staged for a retry");
}

#[test]
fn position_fix_submits_the_staged_media() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    on_upload_screen(&app, &mut model);
    app.update(
        Event::MediaStaged {
            file_name: "beach.jpg".to_string(),
            data: media_bytes(),
        },
        &mut model,
    );
    app.update(Event::UploadRequested, &mut model);

    let update = app.update(
        Event::UploadPositionFixed(Ok(GeoFix { lat: 24.7136, lon: 46.6753 })),
        &mut model,
    );
    assert!(has_http(&update.effects));
}

#[test]
fn no_detection_is_an_info_outcome() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    on_upload_screen(&app, &mut model);
    app.update(
        Event::MediaStaged {
            file_name: "beach.jpg".to_string(),
            data: media_bytes(),
        },
        &mut model,
    );
    app.update(Event::UploadRequested, &mut model);
    model.notifications.clear();

    let update = app.update(
        Event::UploadCompleted(Ok(SubmissionOutcome {
            message: "No alert generated".to_string(),
            alert: None,
        })),
        &mut model,
    );

    assert!(!model.upload_in_progress);
    assert!(model.staged_media.is_none(), "successful upload unstages");
    assert_eq!(model.notifications.len(), 1);
    assert_eq!(model.notifications.entries()[0].severity, Severity::Info);
    assert!(!has_http(&update.effects), "a quiet outcome does not reload");
}

#[test]
fn detected_alert_notifies_sticky_and_reloads() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    on_upload_screen(&app, &mut model);
    app.update(
        Event::MediaStaged {
            file_name: "beach.jpg".to_string(),
            data: media_bytes(),
        },
        &mut model,
    );
    app.update(Event::UploadRequested, &mut model);
    model.notifications.clear();

    let update = app.update(
        Event::UploadCompleted(Ok(detection(AlertType::Alert))),
        &mut model,
    );

    let notes = model.notifications.entries();
    assert_eq!(notes.len(), 2);
    assert!(notes[0].sticky);
    assert_eq!(notes[0].severity, Severity::Warning);
    assert_eq!(notes[0].message, "Alert generated");
    assert!(!notes[1].sticky);
    assert_eq!(notes[1].message, "Upload successful");
    assert!(has_http(&update.effects), "detection triggers a reload");
}

#[test]
fn false_positive_gets_a_muted_notice() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    on_upload_screen(&app, &mut model);
    app.update(
        Event::MediaStaged {
            file_name: "beach.jpg".to_string(),
            data: media_bytes(),
        },
        &mut model,
    );
    app.update(Event::UploadRequested, &mut model);
    model.notifications.clear();

    app.update(
        Event::UploadCompleted(Ok(detection(AlertType::FalsePositive))),
        &mut model,
    );

    let sticky: Vec<_> = model
        .notifications
        .entries()
        .iter()
        .filter(|n| n.sticky)
        .collect();
    assert_eq!(sticky.len(), 1);
    assert_eq!(sticky[0].severity, Severity::Muted);
    assert_eq!(sticky[0].message, "False positive");
}

#[test]
fn critical_detection_raises_the_prompt() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    on_upload_screen(&app, &mut model);
    app.update(
        Event::MediaStaged {
            file_name: "beach.jpg".to_string(),
            data: media_bytes(),
        },
        &mut model,
    );
    app.update(Event::UploadRequested, &mut model);

    app.update(
        Event::UploadCompleted(Ok(detection(AlertType::Critical))),
        &mut model,
    );
    let critical = App.view(&model).critical_alert.expect("prompt is raised");
    assert_eq!(critical.id.as_str(), "det1");

    app.update(Event::CriticalPromptDismissed, &mut model);
    assert!(App.view(&model).critical_alert.is_none());
}

#[test]
fn failed_upload_keeps_the_staged_file() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    on_upload_screen(&app, &mut model);
    app.update(
        Event::MediaStaged {
            file_name: "beach.jpg".to_string(),
            data: media_bytes(),
        },
        &mut model,
    );
    app.update(Event::UploadRequested, &mut model);
    model.notifications.clear();

    app.update(
        Event::UploadCompleted(Err(TransportError::Status {
            code: 500,
            message: "Internal Server Error".to_string(),
        })),
        &mut model,
    );

    assert!(!model.upload_in_progress);
    assert!(model.staged_media.is_some());
    let note = &model.notifications.entries()[0];
    assert_eq!(note.severity, Severity::Error);
    assert!(note.message.starts_with("Upload failed"));
}

#[test]
fn clearing_the_file_mid_fix_releases_the_upload_flag() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    on_upload_screen(&app, &mut model);
    app.update(
        Event::MediaStaged {
            file_name: "beach.jpg".to_string(),
            data: media_bytes(),
        },
        &mut model,
    );
    app.update(Event::UploadRequested, &mut model);
    app.update(Event::MediaCleared, &mut model);
    model.notifications.clear();

    // The fix arrives for a file that is no longer staged.
    let update = app.update(
        Event::UploadPositionFixed(Ok(GeoFix { lat: 24.7136, lon: 46.6753 })),
        &mut model,
    );

    assert!(!has_http(&update.effects), "nothing left to upload");
    assert!(!model.upload_in_progress, "the flag must not wedge");
    assert_eq!(model.notifications.entries()[0].severity, Severity::Warning);

    // A fresh stage-and-upload goes through as usual.
    app.update(
        Event::MediaStaged {
            file_name: "cliff.jpg".to_string(),
            data: media_bytes(),
        },
        &mut model,
    );
    let update = app.update(Event::UploadRequested, &mut model);
    assert!(model.upload_in_progress);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Location(_))));
}

#[test]
fn late_response_after_navigation_is_ignored() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    on_upload_screen(&app, &mut model);
    app.update(
        Event::MediaStaged {
            file_name: "beach.jpg".to_string(),
            data: media_bytes(),
        },
        &mut model,
    );
    app.update(Event::UploadRequested, &mut model);
    app.update(Event::ScreenChanged(Screen::Home), &mut model);

    let update = app.update(
        Event::UploadCompleted(Ok(detection(AlertType::Critical))),
        &mut model,
    );
    assert!(model.critical_prompt.is_none());
    assert!(model.notifications.is_empty());
    assert!(!has_http(&update.effects));
}
