use aws_sdk_ecs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use ecs_manager_core::fault::source_chain;
use ecs_manager_core::{Fault, FaultKind};

/// Converts any SDK operation error into a remote-call fault.
///
/// The title is the service error code when the service sent one, else the
/// kind of SDK failure. ECS and SSM share the same error types.
pub fn sdk_fault<E, R>(error: SdkError<E, R>) -> Fault
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    let title = match error.code() {
        Some(code) => code.to_string(),
        None => failure_kind(&error).to_string(),
    };
    let message = DisplayErrorContext(&error).to_string();
    Fault::new(FaultKind::Remote, title, message).with_trace(source_chain(&error))
}

fn failure_kind<E, R>(error: &SdkError<E, R>) -> &'static str {
    match error {
        SdkError::ConstructionFailure(_) => "ConstructionFailure",
        SdkError::TimeoutError(_) => "TimeoutError",
        SdkError::DispatchFailure(_) => "DispatchFailure",
        SdkError::ResponseError(_) => "ResponseError",
        SdkError::ServiceError(_) => "ServiceError",
        _ => "SdkError",
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_ecs::error::ErrorMetadata;
    use aws_sdk_ecs::operation::describe_services::DescribeServicesError;

    use super::*;

    #[test]
    fn service_errors_are_titled_by_code() {
        let service_error = DescribeServicesError::generic(
            ErrorMetadata::builder()
                .code("ClusterNotFoundException")
                .message("Cluster not found.")
                .build(),
        );
        let error = SdkError::service_error(service_error, ());

        let fault = sdk_fault(error);

        assert_eq!(fault.kind(), FaultKind::Remote);
        assert_eq!(fault.title(), "ClusterNotFoundException");
        assert!(fault.message().is_string());
    }

    #[test]
    fn transport_failures_are_titled_by_kind() {
        let error: SdkError<DescribeServicesError, ()> =
            SdkError::construction_failure("missing region");

        let fault = sdk_fault(error);

        assert_eq!(fault.title(), "ConstructionFailure");
        assert_eq!(fault.trace(), ["missing region".to_string()]);
    }
}
