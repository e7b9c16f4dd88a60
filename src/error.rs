use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store connection lock poisoned")]
    Poisoned,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error status: {0}")]
    Status(u16),

    #[error("malformed JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum FavoritesError {
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),

    #[error("stored favorites are not valid JSON: {0}")]
    Decode(serde_json::Error),

    #[error("failed to encode favorites: {0}")]
    Encode(serde_json::Error),
}
