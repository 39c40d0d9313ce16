use thiserror::Error;

#[derive(Debug, Error)]
pub enum CourierError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation backend error: {0}")]
    Provider(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Channel error ({channel}): {reason}")]
    Channel { channel: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CourierError>;
