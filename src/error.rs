//! Error types for observable lists.

use thiserror::Error;

/// Main error type for list operations and observer delivery.
#[derive(Debug, Error)]
pub enum ListError {
    #[error("Index out of range: {index} (length is {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unsupported event kind: {0}")]
    UnsupportedEvent(&'static str),

    #[error("Fork target has been dropped")]
    Detached,

    #[error("Subscriber channel is full")]
    ChannelFull,

    #[error("Subscriber channel is closed")]
    ChannelClosed,

    #[error("Observer error: {0}")]
    Observer(String),
}

impl<T> From<crossbeam_channel::TrySendError<T>> for ListError {
    fn from(e: crossbeam_channel::TrySendError<T>) -> Self {
        match e {
            crossbeam_channel::TrySendError::Full(_) => ListError::ChannelFull,
            crossbeam_channel::TrySendError::Disconnected(_) => ListError::ChannelClosed,
        }
    }
}

/// Result type for list operations.
pub type Result<T> = std::result::Result<T, ListError>;
