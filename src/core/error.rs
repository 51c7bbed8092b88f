use thiserror::Error;

/// Errors returned by engine commands.
///
/// Physics never fails: missing chunks, occupied targets and rejected
/// rotations are ordinary outcomes, not errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("failed to parse settings json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("shape template {width}x{height} needs {expected} pixels, got {actual}")]
    TemplateSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("shape template {width}x{height} is too large")]
    TemplateTooLarge { width: u32, height: u32 },

    #[error("shape template has no opaque pixels")]
    EmptyTemplate,

    #[error("unknown element kind id {0}")]
    UnknownKind(u8),

    #[error("no chunk contains world cell ({x}, {y})")]
    OutOfWorld { x: i32, y: i32 },

    #[error("world cell ({x}, {y}) is already occupied")]
    Occupied { x: i32, y: i32 },
}

pub type EngineResult<T> = Result<T, EngineError>;
