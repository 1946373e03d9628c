use crate::delivery::DeliveryError;
use crate::feed::error::FeedError;
use crate::isin::IsinError;
use crate::repository::error::DatabaseError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error(transparent)]
    InvalidIsin(#[from] IsinError),

    #[error("FeedError: {0}")]
    FeedError(#[from] FeedError),

    #[error("DatabaseError: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("DeliveryError: {0}")]
    DeliveryError(#[from] DeliveryError),
}
