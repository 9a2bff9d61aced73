/// Errors returned by the quad geometry helpers.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("invalid marker geometry: expected 4 corners, got {len}")]
    InvalidGeometry { len: usize },
}
