/// Core error type for the bot.
///
/// Adapter crates map their SDK errors into this type so the core can decide
/// what is reported to users and what is only logged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("object store error: {0}")]
    Store(String),

    #[error("attachment download failed: {0}")]
    Fetch(String),

    #[error("chat error: {0}")]
    Chat(String),

    #[error("no free storage key for {base} after {attempts} attempts")]
    KeysExhausted { base: String, attempts: u32 },

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single attachment upload.
///
/// Never fatal to the pipeline: the caller reports it to the channel and moves
/// on to the next attachment.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("could not allocate a storage key: {0}")]
    Allocation(#[source] Error),

    #[error("could not read the attachment: {0}")]
    Fetch(#[source] Error),

    #[error("could not write to storage: {0}")]
    Write(#[source] Error),
}
