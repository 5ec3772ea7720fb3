/// Failure categories surfaced to the caller.
///
/// Each variant maps to a distinct user-facing message; none of them is fatal
/// to the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No locator pattern matched the input.
    #[error("no YouTube video reference found in: {input}")]
    NotFound { input: String },

    /// The generation service filtered its answer.
    #[error("response blocked by safety filters")]
    SafetyBlock,

    /// The generation service returned no usable text.
    #[error("empty response from generation service")]
    EmptyResponse,

    /// The generation call was rejected with HTTP 429.
    #[error("rate limited by generation service")]
    RateLimited,

    /// Missing or rejected credentials.
    #[error("generation service rejected credentials")]
    Unauthorized,

    /// Anything else from the generation boundary, detail kept for logs.
    #[error("analysis failed: {0}")]
    General(String),
}

impl Error {
    /// Message shown to the user for this category.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => {
                "Could not find a YouTube video in that link. Supported: watch, youtu.be, embed and shorts URLs."
            }
            Error::SafetyBlock => "The analysis was blocked by the AI safety filters for this video.",
            Error::EmptyResponse => "The AI could not find any information about this video.",
            Error::RateLimited => "Too many requests right now. Wait a moment and retry.",
            Error::Unauthorized => "The API key is missing or invalid. Set GEMINI_API_KEY and try again.",
            Error::General(_) => "Something went wrong while analysing the video. Please retry.",
        }
    }

    /// Whether re-issuing the same request can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Error::NotFound { .. } | Error::Unauthorized)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
