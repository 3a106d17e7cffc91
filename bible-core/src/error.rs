use thiserror::Error;

#[derive(Debug, Error)]
pub enum BibleError {
    /// The API answered with `{"error": ...}`. Shown to the user verbatim.
    #[error("{0}")]
    Upstream(String),
    /// Connection, DNS, timeout or server-side failure.
    #[error("failed to reach Bible API: {0}")]
    Transport(String),
    #[error("unexpected response from Bible API (status {status}): {detail}")]
    Decode { status: u16, detail: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl BibleError {
    /// Text shown in tool results and on the CLI.
    pub fn user_message(&self) -> String {
        format!("Error: {}", self)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, BibleError::Transport(_))
    }
}

impl From<reqwest::Error> for BibleError {
    fn from(e: reqwest::Error) -> Self {
        BibleError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BibleError>;
