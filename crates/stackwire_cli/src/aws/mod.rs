//! AWS SDK adapters behind the provisioning and data API seams.

pub mod cloudformation;
pub mod cognito;
pub mod rds_data;
pub mod s3;

use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

/// Service error codes that signal throttling rather than a real failure.
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
    "ServiceUnavailable",
    "ServiceUnavailableException",
];

/// Flatten an SDK error into a message and whether it is worth retrying.
///
/// Timeouts, dispatch failures and unparseable responses count as transient,
/// as do throttled service errors.
pub(crate) fn describe_sdk_error<E, R>(err: &SdkError<E, R>) -> (String, bool)
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let transient = match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => true,
        SdkError::ServiceError(_) => err
            .code()
            .map_or(false, |code| THROTTLING_CODES.contains(&code)),
        _ => false,
    };
    (DisplayErrorContext(err).to_string(), transient)
}
