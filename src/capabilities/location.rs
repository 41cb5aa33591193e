use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub struct Location<Ev> {
    context: CapabilityContext<LocationOperation, Ev>,
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<Ev> Location<Ev> {
    pub fn new(context: CapabilityContext<LocationOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Location<Ev>
where
    Ev: Send + 'static,
{
    pub fn current_position<F>(&self, make_event: F)
    where
        F: Fn(LocationResult) -> Ev + Send + Sync + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(LocationOperation::CurrentPosition)
                .await;
            context.update_app(make_event(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationOperation {
    CurrentPosition,
}

impl Operation for LocationOperation {
    type Output = LocationResult;
}

/// A position as reported by the shell. Values are raw and may be out of
/// range; the app validates them before use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoFix {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("timed out waiting for a position")]
    Timeout,
}

pub type LocationResult = Result<GeoFix, LocationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_render_for_display() {
        let err = LocationError::Unavailable {
            reason: "no GPS hardware".to_string(),
        };
        assert_eq!(err.to_string(), "location unavailable: no GPS hardware");
        assert_eq!(
            LocationError::PermissionDenied.to_string(),
            "location permission denied"
        );
    }
}
