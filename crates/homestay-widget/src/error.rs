#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid base url: {0}")]
    BaseUrl(String),

    #[error("listing id cannot be sent in a path: {0:?}")]
    ListingId(String),
}
