//! AWS control-plane access: SDK configuration, credential checks, the
//! ECS / ELBv2 adapters and the report-only infrastructure lookups.

mod ecs;
mod elb;
mod infrastructure;

pub use ecs::*;
pub use elb::*;
pub use infrastructure::*;

use std::error::Error;
use std::time::Duration;

use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_ecs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use tracing::debug;

use crate::error::{AdapterError, CheckError};

/// Error codes meaning the caller's identity was rejected outright
const AUTH_ERROR_CODES: &[&str] = &[
    "UnrecognizedClientException",
    "InvalidClientTokenId",
    "InvalidSignatureException",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "ExpiredTokenException",
    "AccessDenied",
    "AccessDeniedException",
];

/// Load the shared SDK configuration for `region`.
///
/// Every operation is bounded by `request_timeout`.
pub async fn load_sdk_config(region: &str, request_timeout: Duration) -> SdkConfig {
    let timeouts = TimeoutConfig::builder()
        .operation_timeout(request_timeout)
        .build();

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .timeout_config(timeouts)
        .load()
        .await
}

/// Resolve credentials once so a missing or broken credential chain aborts
/// the run before any polling starts.
pub async fn verify_credentials(config: &SdkConfig) -> Result<(), CheckError> {
    let provider = config
        .credentials_provider()
        .ok_or_else(|| CheckError::NoCredentials("no credentials provider configured".to_string()))?;

    provider
        .provide_credentials()
        .await
        .map_err(|e| CheckError::NoCredentials(DisplayErrorContext(&e).to_string()))?;

    debug!("AWS credentials resolved");
    Ok(())
}

/// Classify an SDK failure into the adapter error taxonomy
pub(crate) fn classify_sdk_error<E, R>(api: &str, err: &SdkError<E, R>, timeout: Duration) -> AdapterError
where
    E: ProvideErrorMetadata + Error + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::TimeoutError(_) => AdapterError::Timeout(timeout),
        SdkError::ServiceError(_) => {
            let code = err.as_service_error().and_then(|e| e.code()).unwrap_or("Unknown");
            let message = err
                .as_service_error()
                .and_then(|e| e.message())
                .unwrap_or("no message");
            if AUTH_ERROR_CODES.contains(&code) {
                AdapterError::Unauthorized(format!("{api}: {code}: {message}"))
            } else {
                AdapterError::Unavailable(format!("{api}: {code}: {message}"))
            }
        }
        _ => AdapterError::Unavailable(format!("{api}: {}", DisplayErrorContext(err))),
    }
}
