use std::fmt;

/// Errors returned by [`Flow`](crate::core::flow::Flow) operations.
#[derive(Debug)]
pub enum FlowError {
    /// No generator is registered under the requested key.
    KeyNotFound { key: String },
    /// The flow has been closed. Registration and navigation are refused.
    Closed,
    /// The apply worker thread could not be started.
    Worker(std::io::Error),
}

impl FlowError {
    pub(crate) fn key_not_found(key: &impl fmt::Debug) -> Self {
        FlowError::KeyNotFound {
            key: format!("{key:?}"),
        }
    }
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::KeyNotFound { key } => write!(f, "flow: key not found: {key}"),
            FlowError::Closed => write!(f, "flow: closed"),
            FlowError::Worker(e) => write!(f, "flow: failed to start apply worker: {e}"),
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlowError::Worker(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_found_names_the_key() {
        let err = FlowError::key_not_found(&"settings");
        assert_eq!(err.to_string(), "flow: key not found: \"settings\"");
    }

    #[test]
    fn test_worker_error_has_source() {
        let err = FlowError::Worker(std::io::Error::other("no threads left"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("no threads left"));
    }
}
