use std::fmt;

/// Top-level error type that carries process exit codes.
#[derive(Debug)]
pub enum QaforgeError {
    /// Persisted state could not be read or written (exit code 2)
    StoreFailed(String),
    /// Input snapshot/event/log file was unusable (exit code 3)
    BadInput(String),
    /// Replay transport failure (exit code 4)
    NetworkFailed(String),
    /// Operation timeout (exit code 5)
    Timeout(String),
    /// Generic error (exit code 1)
    Other(anyhow::Error),
}

impl QaforgeError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            QaforgeError::StoreFailed(_) => 2,
            QaforgeError::BadInput(_) => 3,
            QaforgeError::NetworkFailed(_) => 4,
            QaforgeError::Timeout(_) => 5,
            QaforgeError::Other(_) => 1,
        }
    }
}

impl fmt::Display for QaforgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QaforgeError::StoreFailed(msg) => write!(f, "Store access failed: {}", msg),
            QaforgeError::BadInput(msg) => write!(f, "Invalid input file: {}", msg),
            QaforgeError::NetworkFailed(msg) => write!(f, "Network request failed: {}", msg),
            QaforgeError::Timeout(msg) => write!(f, "Operation timed out: {}", msg),
            QaforgeError::Other(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for QaforgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QaforgeError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for QaforgeError {
    fn from(err: anyhow::Error) -> Self {
        // Try to detect specific error types from the error chain
        if err.downcast_ref::<crate::store::StoreError>().is_some() {
            return QaforgeError::StoreFailed(err.to_string());
        }

        let msg = err.to_string();
        if msg.contains("store") && (msg.contains("I/O") || msg.contains("not valid JSON")) {
            QaforgeError::StoreFailed(msg)
        } else if msg.contains("snapshot") || msg.contains("events file") || msg.contains("call log")
        {
            QaforgeError::BadInput(msg)
        } else if msg.contains("timeout") || msg.contains("timed out") {
            QaforgeError::Timeout(msg)
        } else if msg.contains("connect") || msg.contains("dns") {
            QaforgeError::NetworkFailed(msg)
        } else {
            QaforgeError::Other(err)
        }
    }
}
