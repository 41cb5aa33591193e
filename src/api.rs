//! Requests to the detection server, and the wire shapes it answers with.

use crux_http::Http;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alert::{Alert, AlertId, LatLon};
use crate::event::Event;
use crate::filter::Filter;
use crate::model::ApiConfig;
use crate::multipart::MultipartForm;

pub type ApiResult<T> = Result<T, TransportError>;

/// What went wrong talking to the server, reduced to what the UI can act on.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransportError {
    #[error("server unreachable: {message}")]
    Unreachable { message: String },

    #[error("server returned {code} {message}")]
    Status { code: u16, message: String },

    #[error("response body did not decode: {message}")]
    Decode { message: String },

    #[error("request could not be encoded: {message}")]
    InvalidRequest { message: String },
}

/// Response to a media submission. `alert` is present only when the server's
/// detector found something in the image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionOutcome {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub alert: Option<Box<Alert>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurgeAck {
    pub deleted: u64,
    #[serde(default)]
    pub files_deleted: u64,
}

pub fn list_alerts<F>(http: &Http<Event>, config: &ApiConfig, make_event: F)
where
    F: Fn(ApiResult<Vec<Alert>>) -> Event + Send + Sync + 'static,
{
    http.get(config.endpoint("/api/alerts"))
        .send(move |response| make_event(decode_json(response)));
}

pub fn create_alert<F>(
    http: &Http<Event>,
    config: &ApiConfig,
    file_name: &str,
    mime: &str,
    data: &[u8],
    position: Option<LatLon>,
    make_event: F,
) where
    F: Fn(ApiResult<SubmissionOutcome>) -> Event + Send + Sync + 'static,
{
    send_media(
        http,
        config.endpoint("/api/alert"),
        file_name,
        mime,
        data,
        position,
        make_event,
    );
}

pub fn submit_frame<F>(
    http: &Http<Event>,
    config: &ApiConfig,
    file_name: &str,
    mime: &str,
    data: &[u8],
    position: LatLon,
    make_event: F,
) where
    F: Fn(ApiResult<SubmissionOutcome>) -> Event + Send + Sync + 'static,
{
    send_media(
        http,
        config.endpoint("/api/webcam"),
        file_name,
        mime,
        data,
        Some(position),
        make_event,
    );
}

pub fn mark_seen<F>(http: &Http<Event>, config: &ApiConfig, id: &AlertId, make_event: F)
where
    F: Fn(ApiResult<()>) -> Event + Send + Sync + 'static,
{
    let url = config.endpoint(&format!("/api/alerts/{}/seen", id.as_str()));
    http.patch(url)
        .send(move |response| make_event(expect_ok(response)));
}

pub fn mark_all_seen<F>(http: &Http<Event>, config: &ApiConfig, make_event: F)
where
    F: Fn(ApiResult<()>) -> Event + Send + Sync + 'static,
{
    http.patch(config.endpoint("/api/alerts/seen"))
        .send(move |response| make_event(expect_ok(response)));
}

#[derive(Serialize)]
struct DeletePayload<'a> {
    image_path: &'a str,
}

/// Deleting an alert also removes its stored image, so the server needs the
/// image path alongside the id.
pub fn delete_alert<F>(
    http: &Http<Event>,
    config: &ApiConfig,
    id: &AlertId,
    image_path: &str,
    make_event: F,
) -> Result<(), TransportError>
where
    F: Fn(ApiResult<()>) -> Event + Send + Sync + 'static,
{
    let url = config.endpoint(&format!("/api/alerts/{}", id.as_str()));
    http.delete(url)
        .body_json(&DeletePayload { image_path })
        .map_err(|e| TransportError::InvalidRequest {
            message: e.to_string(),
        })?
        .send(move |response| make_event(expect_ok(response)));
    Ok(())
}

pub fn delete_by_filter<F>(
    http: &Http<Event>,
    config: &ApiConfig,
    filter: &Filter,
    make_event: F,
) -> Result<(), TransportError>
where
    F: Fn(ApiResult<PurgeAck>) -> Event + Send + Sync + 'static,
{
    http.post(config.endpoint("/api/alerts/delete_by_filter"))
        .body_json(filter)
        .map_err(|e| TransportError::InvalidRequest {
            message: e.to_string(),
        })?
        .send(move |response| make_event(decode_json(response)));
    Ok(())
}

fn send_media<F>(
    http: &Http<Event>,
    url: String,
    file_name: &str,
    mime: &str,
    data: &[u8],
    position: Option<LatLon>,
    make_event: F,
) where
    F: Fn(ApiResult<SubmissionOutcome>) -> Event + Send + Sync + 'static,
{
    let mut form = MultipartForm::new().file("file", file_name, mime, data);
    if let Some(position) = position {
        form = form
            .text("lat", &position.lat.to_string())
            .text("lon", &position.lon.to_string());
    }
    let (content_type, body) = form.finish();

    http.post(url)
        .header("content-type", content_type.as_str())
        .body_bytes(body)
        .send(move |response| make_event(decode_json(response)));
}

fn decode_json<T>(response: crux_http::Result<crux_http::Response<Vec<u8>>>) -> ApiResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let mut response = response.map_err(|e| TransportError::Unreachable {
        message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status {
            code: status.into(),
            message: status.canonical_reason().to_string(),
        });
    }

    let body = response.take_body().unwrap_or_default();
    serde_json::from_slice(&body).map_err(|e| TransportError::Decode {
        message: e.to_string(),
    })
}

fn expect_ok(response: crux_http::Result<crux_http::Response<Vec<u8>>>) -> ApiResult<()> {
    let response = response.map_err(|e| TransportError::Unreachable {
        message: e.to_string(),
    })?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(TransportError::Status {
            code: status.into(),
            message: status.canonical_reason().to_string(),
        })
    }
}
