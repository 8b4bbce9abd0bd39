use crate::api::ApiError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum QueryError {
    /// The filter has no complete time range yet.
    #[error("Time range is not set")]
    MissingTimeRange,

    #[error(transparent)]
    Api(#[from] ApiError),
}
