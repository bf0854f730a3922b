use crate::error::ApiError;
use validator::Validate;

pub fn validate<T: Validate>(value: &T) -> Result<(), ApiError> {
    value.validate().map_err(|err| {
        tracing::debug!(error = %err, "request rejected");
        ApiError::Validation(err.to_string())
    })
}
