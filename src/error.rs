/// Errors raised synchronously by the engine. An unreachable goal is not an
/// error; it is delivered to the path callback as `None`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathfindError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("point ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}
