mod camera;
mod location;
mod timer;

pub use self::camera::{
    Camera, CameraError, CameraOperation, CameraOutput, CameraResult, CapturedFrame, FrameFormat,
};
pub use self::location::{GeoFix, Location, LocationError, LocationOperation, LocationResult};
pub use self::timer::{Timer, TimerOperation, TimerOutput};

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub http: Http<Event>,
    pub camera: Camera<Event>,
    pub location: Location<Event>,
    pub timer: Timer<Event>,
}
