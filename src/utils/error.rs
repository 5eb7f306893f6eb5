use std::fmt;
use thiserror::Error;

/// 外部服務 (recognition / catalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Recognition,
    Catalog,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Upstream::Recognition => write!(f, "recognition"),
            Upstream::Catalog => write!(f, "catalog"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 外部服務連線或狀態錯誤
    Upstream,
    /// 外部回應內容無法使用
    Data,
    /// 呼叫端請求錯誤
    Client,
    /// 本機 I/O、設定等
    System,
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("{service} service unavailable: {message}")]
    UpstreamUnavailable {
        service: Upstream,
        message: String,
        timed_out: bool,
    },

    #[error("API request failed: {body}")]
    UpstreamBadStatus {
        service: Upstream,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {service} service: {message}")]
    MalformedResponse { service: Upstream, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid request: {field}: {reason}")]
    InvalidRequest { field: String, reason: String },

    #[error("Upload too large: {0}")]
    UploadTooLarge(String),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RelayError {
    /// 將 reqwest 傳輸錯誤轉為 UpstreamUnavailable
    pub fn unavailable(service: Upstream, err: reqwest::Error) -> Self {
        let timed_out = err.is_timeout();
        let message = if timed_out {
            format!("request timed out: {}", err)
        } else {
            err.to_string()
        };
        RelayError::UpstreamUnavailable {
            service,
            message,
            timed_out,
        }
    }

    pub fn invalid_request(field: &str, reason: impl Into<String>) -> Self {
        RelayError::InvalidRequest {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RelayError::UpstreamUnavailable { .. } | RelayError::UpstreamBadStatus { .. } => {
                ErrorCategory::Upstream
            }
            RelayError::MalformedResponse { .. } | RelayError::NotFound(_) => ErrorCategory::Data,
            RelayError::InvalidRequest { .. } | RelayError::UploadTooLarge(_) => {
                ErrorCategory::Client
            }
            RelayError::ConfigError { .. } | RelayError::IoError(_) | RelayError::Internal { .. } => {
                ErrorCategory::System
            }
        }
    }

    /// HTTP status code returned to the caller.
    ///
    /// Upstream 4xx/5xx statuses are mirrored; anything else an upstream
    /// returns that is not a success becomes 502.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::UpstreamUnavailable { timed_out: true, .. } => 504,
            RelayError::UpstreamUnavailable { .. } => 502,
            RelayError::UpstreamBadStatus { status, .. } if (400..600).contains(status) => *status,
            RelayError::UpstreamBadStatus { .. } => 502,
            RelayError::MalformedResponse { .. } => 500,
            RelayError::NotFound(_) => 404,
            RelayError::InvalidRequest { .. } => 400,
            RelayError::UploadTooLarge(_) => 413,
            RelayError::ConfigError { .. } | RelayError::IoError(_) | RelayError::Internal { .. } => {
                500
            }
        }
    }

    /// Short label used as the `error` field of response bodies.
    pub fn label(&self) -> &'static str {
        match self {
            RelayError::UpstreamUnavailable { .. } => "Upstream service unavailable",
            RelayError::UpstreamBadStatus { .. } => "Upstream request failed",
            RelayError::MalformedResponse { .. } => "Bad upstream format",
            RelayError::NotFound(_) => "Not found",
            RelayError::InvalidRequest { .. } => "Invalid request",
            RelayError::UploadTooLarge(_) => "Upload too large",
            RelayError::ConfigError { .. }
            | RelayError::IoError(_)
            | RelayError::Internal { .. } => "An internal error occurred",
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
