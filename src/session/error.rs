use std::fmt;

#[derive(Debug)]
pub enum AutofillError {
    /// Node.js viewer bridge failed to spawn
    BridgeSpawn { script: String, source: std::io::Error },

    /// Reading from or writing to the bridge failed
    BridgeIo(String),

    /// Bridge answered but reported a command failure
    BridgeProtocol { command: String, error: String },

    /// JSON parsing failed (bridge output or backend body)
    JsonParse { context: String, source: serde_json::Error },

    /// JSON serialization failed (command to the bridge)
    JsonSerialize { context: String, source: serde_json::Error },

    /// Autofill backend returned a non-success HTTP status
    BackendStatus { status: u16 },

    /// Network-level failure talking to the autofill backend
    BackendTransport(reqwest::Error),

    /// A write targeted a node the surface no longer holds
    ElementNotFound { node: u64 },
}

impl fmt::Display for AutofillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutofillError::BridgeSpawn { script, source } => {
                write!(f, "Failed to spawn {} (is Node.js installed?): {}", script, source)
            }
            AutofillError::BridgeIo(msg) => {
                write!(f, "Bridge I/O error: {}", msg)
            }
            AutofillError::BridgeProtocol { command, error } => {
                write!(f, "Bridge command '{}' failed: {}", command, error)
            }
            AutofillError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            AutofillError::JsonSerialize { context, source } => {
                write!(f, "JSON serialize error ({}): {}", context, source)
            }
            AutofillError::BackendStatus { status } => {
                write!(f, "Autofill backend returned HTTP {}", status)
            }
            AutofillError::BackendTransport(source) => {
                write!(f, "Autofill backend unreachable: {}", source)
            }
            AutofillError::ElementNotFound { node } => {
                write!(f, "No element with node handle {}", node)
            }
        }
    }
}

impl std::error::Error for AutofillError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AutofillError::BridgeSpawn { source, .. } => Some(source),
            AutofillError::JsonParse { source, .. } => Some(source),
            AutofillError::JsonSerialize { source, .. } => Some(source),
            AutofillError::BackendTransport(source) => Some(source),
            _ => None,
        }
    }
}
