//! Result and error types for garden-smoke.

use thiserror::Error;

/// Result type for harness operations
pub type SmokeResult<T> = Result<T, SmokeError>;

/// Errors that can occur while driving the site.
///
/// Assertion failures are not errors: they are recorded as outcomes by the
/// [`Recorder`](crate::Recorder). These variants cover the unexpected tier,
/// which the scenario runner converts into a single failure per scenario.
#[derive(Debug, Error)]
pub enum SmokeError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Browser did not close cleanly at teardown
    #[error("Failed to shut down browser: {message}")]
    Shutdown {
        /// Error message
        message: String,
    },

    /// Browser context could not be created or disposed
    #[error("Browser context error: {message}")]
    Context {
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        waited_for: String,
    },

    /// Script evaluation error (includes DOM queries with a broken selector)
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// An action targeted an element that is not in the DOM
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Selector description
        selector: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// A scenario panicked
    #[error("Scenario panicked: {message}")]
    Panic {
        /// Panic payload
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl SmokeError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a script evaluation error
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::Page {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_error_names_url() {
        let err = SmokeError::Navigation {
            url: "http://localhost:5173/posts".to_string(),
            message: "net::ERR_CONNECTION_REFUSED".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("/posts"));
        assert!(text.contains("ERR_CONNECTION_REFUSED"));
    }

    #[test]
    fn test_timeout_error() {
        let err = SmokeError::Timeout {
            ms: 30_000,
            waited_for: "networkidle".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 30000ms waiting for networkidle"
        );
    }

    #[test]
    fn test_shutdown_error_is_not_a_launch_error() {
        let err = SmokeError::Shutdown {
            message: "connection closed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to shut down browser: connection closed"
        );
        assert!(!err.to_string().contains("launch"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SmokeError = io.into();
        assert!(matches!(err, SmokeError::Io(_)));
    }

    #[test]
    fn test_constructors() {
        assert!(SmokeError::config("bad").to_string().contains("Configuration"));
        assert!(SmokeError::script("boom").to_string().contains("boom"));
        assert!(SmokeError::page("gone").to_string().starts_with("Page error"));
    }
}
