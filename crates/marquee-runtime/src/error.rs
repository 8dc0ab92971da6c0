use marquee_api::GatewayError;
use marquee_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("not authorized: {0}")]
    Auth(String),
    #[error("gateway error: {0}")]
    Gateway(GatewayError),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("not signed in")]
    NotAuthenticated,
}

impl From<GatewayError> for RuntimeError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Unauthorized { message, .. } => Self::Auth(message),
            other => Self::Gateway(other),
        }
    }
}

impl From<CoreError> for RuntimeError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Validation(msg) => Self::Validation(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_auth() {
        let e: RuntimeError = GatewayError::from_status(401, "bad password".into()).into();
        assert!(matches!(e, RuntimeError::Auth(ref m) if m == "bad password"));

        let e: RuntimeError = GatewayError::from_status(502, "upstream".into()).into();
        assert!(matches!(e, RuntimeError::Gateway(_)));
    }

    #[test]
    fn test_core_validation_stays_validation() {
        let e: RuntimeError = CoreError::Validation("not a detail path".into()).into();
        assert!(matches!(e, RuntimeError::Validation(_)));
    }
}
