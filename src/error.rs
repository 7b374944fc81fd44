use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unrecognized date: {0:?}")]
    UnrecognizedDate(String),

    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("Invalid year range: {min}..={max}")]
    InvalidYearRange { min: i32, max: i32 },

    #[error("No prices recorded for product {0:?}")]
    NoSuchProduct(String),

    #[error("No price for {product:?} at {store:?} on or before {date}")]
    DateTooEarly {
        product: String,
        store: String,
        date: NaiveDate,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
