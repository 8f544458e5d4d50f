use super::types::ProbeKitError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl ProbeKitError {
    /// Classify this error to determine its type and whether a probe may retry it.
    ///
    /// Only connection-level failures are transient. Anything that happens
    /// after a response arrived, or before a request could be built, is final.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Transient
            ProbeKitError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                retryable: true,
            },
            ProbeKitError::Timeout(_) => ErrorClassification {
                error_type: "TimeoutError",
                retryable: true,
            },

            // Permanent
            ProbeKitError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                retryable: false,
            },
            ProbeKitError::InvalidTarget(_) => ErrorClassification {
                error_type: "InvalidTargetError",
                retryable: false,
            },
            ProbeKitError::ResponseProcessing(_) => ErrorClassification {
                error_type: "ResponseProcessingError",
                retryable: false,
            },
            ProbeKitError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: false,
            },
            ProbeKitError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: false,
            },
            ProbeKitError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                retryable: false,
            },
            ProbeKitError::Csv(_) => ErrorClassification {
                error_type: "CsvError",
                retryable: false,
            },
            ProbeKitError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                retryable: false,
            },
        }
    }

    pub fn is_transient(&self) -> bool {
        self.classify().retryable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_retryable() {
        let err = ProbeKitError::Network("connection refused".into());
        let class = err.classify();
        assert!(class.retryable);
        assert_eq!(class.error_type, "NetworkError");
    }

    #[test]
    fn test_timeout_retryable() {
        let err = ProbeKitError::Timeout("timed out".into());
        assert!(err.classify().retryable);
        assert!(err.is_transient());
    }

    #[test]
    fn test_response_processing_not_retryable() {
        let err = ProbeKitError::ResponseProcessing("invalid utf-8".into());
        let class = err.classify();
        assert!(!class.retryable);
        assert_eq!(class.error_type, "ResponseProcessingError");
    }

    #[test]
    fn test_config_error_not_retryable() {
        let err = ProbeKitError::Config("missing wordlist".into());
        assert!(!err.classify().retryable);
    }

    #[test]
    fn test_invalid_target_not_retryable() {
        let err = ProbeKitError::InvalidTarget("not a url".into());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_internal_not_retryable() {
        let err = ProbeKitError::Internal("worker panicked".into());
        assert!(!err.classify().retryable);
    }
}
