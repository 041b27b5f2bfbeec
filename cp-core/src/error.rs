use thiserror::Error;

use crate::types::HandleId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("closest pair needs at least 2 points, got {count}")]
    InsufficientPoints { count: usize },

    #[error("line {line}: expected `<number>,<number>`, got {text:?}")]
    MalformedPointLine { line: usize, text: String },

    /// An event removed a handle that was never created or is already gone.
    #[error("event references unknown handle {handle}")]
    DanglingHandle { handle: HandleId },

    /// An event created a handle that is still alive.
    #[error("event re-creates live handle {handle}")]
    DuplicateHandle { handle: HandleId },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error signals a bug in the event stream rather than bad input.
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::DanglingHandle { .. } | Self::DuplicateHandle { .. }
        )
    }
}
