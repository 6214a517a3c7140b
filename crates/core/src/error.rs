use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("no pdf files found in {0}")]
    NoPdfFiles(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("tokenizer unavailable: {0}")]
    Tokenizer(String),
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion api returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid completion response: {0}")]
    Parse(String),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("completion client not configured: {0}")]
    NotConfigured(String),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no documents loaded; load a document folder first")]
    NotLoaded,

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("greeting pattern error: {0}")]
    Greeting(#[from] regex::Error),
}

pub type Result<T, E = LoadError> = std::result::Result<T, E>;
