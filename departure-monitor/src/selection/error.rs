//! Selection error types.

use crate::mvv::MvvError;

/// Errors from building or persisting a line selection.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    /// The picked stop has an empty id
    #[error("selected stop has no id")]
    MissingStopId,

    /// Nothing would be tracked at the stop
    #[error("no lines selected for stop {stop_id}")]
    NoLinesSelected { stop_id: String },

    /// No stop has been picked yet
    #[error("no stop picked")]
    NoStopPicked,

    /// Loading the stop's available lines failed
    #[error("failed to load lines: {0}")]
    Lines(#[from] MvvError),

    /// Persisting the selection failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("storage I/O error: {message}")]
    Io { message: String },

    /// A value was not valid JSON
    #[error("storage JSON error: {message}")]
    Json { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_stop() {
        let err = SelectionError::NoLinesSelected {
            stop_id: "de:09162:6".into(),
        };
        assert_eq!(err.to_string(), "no lines selected for stop de:09162:6");
    }

    #[test]
    fn store_errors_are_transparent() {
        let err: SelectionError = StoreError::Io {
            message: "disk full".into(),
        }
        .into();
        assert_eq!(err.to_string(), "storage I/O error: disk full");
    }
}
