// lib.rs - Complete Production Implementation

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod alert;
pub mod api;
pub mod app;
pub mod capabilities;
pub mod event;
pub mod feed;
pub mod filter;
pub mod heatmap;
pub mod model;
pub mod multipart;
pub mod notifications;

pub use app::{AlertRow, App, PurgeDialogView, ViewModel};
pub use capabilities::{Capabilities, Effect};
pub use event::Event;
pub use model::Model;
pub use crux_core::{render::Render, App as CruxApp};

/// Where alert traffic goes unless the shell overrides it.
pub const DEFAULT_API_BASE: &str = "https://console.sar-detect.example.com";

pub const PAGE_SIZE: usize = 10;
pub const MAX_NOTIFICATIONS: usize = 8;
pub const NOTIFICATION_TTL_MS: u64 = 3000;
pub const CAPTURE_PERIOD_MS: u64 = 1000;
pub const MAX_IN_FLIGHT_UPLOADS: usize = 3;
pub const MAX_FRAME_BYTES: usize = 10 * 1024 * 1024;
