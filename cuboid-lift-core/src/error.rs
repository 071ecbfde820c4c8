use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiftError {
    #[error("payload.camera is required")]
    MissingCamera,
    #[error("payload.detection is required")]
    MissingDetection,
    #[error("payload.object is required")]
    MissingObject,
    #[error("camera.planPositionM must be a 2-element numeric list")]
    InvalidCameraPosition,
    #[error("object.sizeM.{dimension} must be finite and positive, got {value}")]
    InvalidObjectSize { dimension: &'static str, value: f64 },
    #[error("ray from anchor does not intersect the floor plane")]
    RayMissesFloor,
    #[error("frames must be a non-empty list yielding at least one valid frame")]
    EmptyBatch,
}

impl LiftError {
    /// Stable, machine-readable tag for this error's kind, independent of the
    /// human-readable message `thiserror` renders via `Display`.
    pub fn kind(&self) -> &'static str {
        match self {
            LiftError::MissingCamera => "MissingCamera",
            LiftError::MissingDetection => "MissingDetection",
            LiftError::MissingObject => "MissingObject",
            LiftError::InvalidCameraPosition => "InvalidCameraPosition",
            LiftError::InvalidObjectSize { .. } => "InvalidObjectSize",
            LiftError::RayMissesFloor => "RayMissesFloor",
            LiftError::EmptyBatch => "EmptyBatch",
        }
    }
}
