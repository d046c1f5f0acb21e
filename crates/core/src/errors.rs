use thiserror::Error;

/// Unified error type for the entire trade-desk-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport ───────────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server responded with HTTP {status}")]
    Http { status: u16 },

    // ── Application / Response ──────────────────────────────────────
    /// The server answered `success: false`; carries its message verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Page / Input ────────────────────────────────────────────────
    #[error("Invalid stepper direction: {0:?}")]
    InvalidDirection(String),

    #[error("Row not found: {0}")]
    RowNotFound(String),

    #[error("Missing page element: {0}")]
    MissingElement(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CoreError {
    /// Text shown to the user in a transient notice.
    ///
    /// Rejections carry the server's own wording; everything else uses the
    /// `Display` form.
    pub fn notice_message(&self) -> String {
        match self {
            CoreError::Rejected(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// True for failures that happened before or during the HTTP exchange.
    pub fn is_transport(&self) -> bool {
        matches!(self, CoreError::Network(_) | CoreError::Http { .. })
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Session tokens occasionally ride in query strings; keep them out of logs and notices.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
