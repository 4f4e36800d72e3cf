//! BIG-IP client errors

/// Error types for BIG-IP REST access
#[derive(Debug, thiserror::Error)]
pub enum BigIpError {
    #[error("BIG-IP {0} is not configured")]
    MissingSetting(&'static str),

    #[error("Invalid object type '{0}'")]
    InvalidObjectType(String),

    #[error("Invalid object name '{0}'")]
    InvalidObjectName(String),

    #[error("BIG-IP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("BIG-IP returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected BIG-IP response: {0}")]
    UnexpectedPayload(String),
}

impl BigIpError {
    /// Whether the caller supplied bad input (as opposed to a remote failure)
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            BigIpError::InvalidObjectType(_) | BigIpError::InvalidObjectName(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let err = BigIpError::Status {
            status: 404,
            message: "The requested Pool (/Common/web) was not found.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "BIG-IP returned 404: The requested Pool (/Common/web) was not found."
        );
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_invalid_input() {
        assert!(BigIpError::InvalidObjectType("../x".into()).is_invalid_input());
        assert!(BigIpError::InvalidObjectName("a?b".into()).is_invalid_input());
        assert!(!BigIpError::MissingSetting("host").is_invalid_input());
    }
}
