use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("bridge access denied: origin {origin} is not the supervisor")]
    AccessDenied { origin: String },

    #[error("path traversal outside scope root: {path}")]
    PathTraversal { path: String },

    #[error("scope {scope} is read-only: {operation} refused")]
    ReadOnlyScope { scope: String, operation: String },

    #[error("file not found: {path}")]
    NotFound { path: String },

    #[error("file already exists: {path}")]
    AlreadyExists { path: String },

    #[error("edit failed for {path}: {reason}")]
    EditConflict { path: String, reason: String },

    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("glob pattern error: {pattern}: {reason}")]
    GlobPattern { pattern: String, reason: String },

    #[error("model error: {reason}")]
    Model { reason: String },

    #[error("model timeout after {timeout_secs}s")]
    ModelTimeout { timeout_secs: u64 },

    #[error("api error: status={status}, body={body}")]
    Api { status: u16, body: String },

    #[error("agent error: {reason}")]
    Agent { reason: String },

    #[error("agent exceeded {limit} steps without finishing")]
    StepLimit { limit: usize },

    #[error("no suspended run for correlation token {token}")]
    UnknownCheckpoint { token: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
