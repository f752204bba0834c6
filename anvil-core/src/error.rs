use thiserror::Error;

/// Errors at the crate boundary. Planning itself never fails; it returns
/// `None` when there is no solution.
#[derive(Debug, Error)]
pub enum AnvilError {
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown move: {0}")]
    UnknownMove(String),

    #[error("progress {0} outside 0..=150")]
    ProgressOutOfRange(i32),

    #[error("invalid rule slot: {0}")]
    InvalidSlot(usize),
}
