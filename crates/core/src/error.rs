#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{}", upstream_display(*status, message))]
    Upstream {
        status: Option<u16>,
        message: String,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("failed to serialize design document: {0}")]
    Serialization(serde_json::Error),
}

fn upstream_display(status: Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("design service returned status {status}: {message}"),
        None => format!("design service request failed: {message}"),
    }
}

impl DesignError {
    /// Builds an `Upstream` error from a transport-level failure (connect, timeout, body read).
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("could not connect: {err}")
        } else {
            err.to_string()
        };
        DesignError::Upstream {
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }

    /// Upstream HTTP status, when the failure came with one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            DesignError::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

pub type DesignResult<T> = std::result::Result<T, DesignError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_display_includes_status_when_known() {
        let err = DesignError::Upstream {
            status: Some(403),
            message: "Invalid token".into(),
        };
        assert_eq!(
            err.to_string(),
            "design service returned status 403: Invalid token"
        );
        assert_eq!(err.upstream_status(), Some(403));
    }

    #[test]
    fn upstream_display_without_status() {
        let err = DesignError::Upstream {
            status: None,
            message: "request timed out".into(),
        };
        assert_eq!(
            err.to_string(),
            "design service request failed: request timed out"
        );
        assert_eq!(DesignError::NotFound("node 1:2".into()).upstream_status(), None);
    }
}
