/***
success 0
common 1~99
validation 1000
routing 2000
dispatch 3000

error message is correspond with error code
*/

use thiserror::Error;

pub trait ErrorCode {
    fn code(&self) -> u16;
    /// short machine readable name returned as `error`
    fn kind(&self) -> &'static str;
    fn http_status(&self) -> u16;
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Common(#[from] ApiCommonError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Route(#[from] RouteError),
    #[error("{source}")]
    Dispatch {
        source: DispatchError,
        /// messages already accepted by the vendor before this failure
        delivered: usize,
    },
}

impl From<DispatchError> for ApiError {
    fn from(source: DispatchError) -> Self {
        ApiError::Dispatch {
            source,
            delivered: 0,
        }
    }
}

impl ErrorCode for ApiError {
    fn code(&self) -> u16 {
        match self {
            ApiError::Common(err) => err.code(),
            ApiError::Validation(err) => err.code(),
            ApiError::Route(err) => err.code(),
            ApiError::Dispatch { source, .. } => source.code(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Common(err) => err.kind(),
            ApiError::Validation(err) => err.kind(),
            ApiError::Route(err) => err.kind(),
            ApiError::Dispatch { source, .. } => source.kind(),
        }
    }

    fn http_status(&self) -> u16 {
        match self {
            ApiError::Common(err) => err.http_status(),
            ApiError::Validation(err) => err.http_status(),
            ApiError::Route(err) => err.http_status(),
            ApiError::Dispatch { source, .. } => source.http_status(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiCommonError {
    #[error("internal error: {0}")]
    Internal(String),
    #[error("Request param is invalid: {0}")]
    RequestParamInvalid(String),
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl ErrorCode for ApiCommonError {
    fn code(&self) -> u16 {
        match self {
            Self::Internal(_) => 1,
            Self::RequestParamInvalid(_) => 2,
            Self::Upstream(_) => 3,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Internal(_) => "internal",
            Self::RequestParamInvalid(_) => "request_param_invalid",
            Self::Upstream(_) => "upstream",
        }
    }

    fn http_status(&self) -> u16 {
        match self {
            Self::RequestParamInvalid(_) => 400,
            Self::Internal(_) | Self::Upstream(_) => 500,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} must be 9 to 12 digits, got {value:?}")]
    MalformedPhone { field: &'static str, value: String },
}

impl ErrorCode for ValidationError {
    fn code(&self) -> u16 {
        match self {
            Self::MissingField(_) => 1001,
            Self::MalformedPhone { .. } => 1002,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::MalformedPhone { .. } => "malformed_phone",
        }
    }

    fn http_status(&self) -> u16 {
        400
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("sender {0} is not an approved sender identity")]
    SenderNotApproved(String),
    #[error("sender {0} is not in the sender allow list")]
    SenderNotAllowed(String),
}

impl ErrorCode for RouteError {
    fn code(&self) -> u16 {
        match self {
            Self::SenderNotApproved(_) => 2001,
            Self::SenderNotAllowed(_) => 2002,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::SenderNotApproved(_) => "sender_not_approved",
            Self::SenderNotAllowed(_) => "sender_not_allowed",
        }
    }

    fn http_status(&self) -> u16 {
        403
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// the vendor answered with a non 2xx status, body kept verbatim
    #[error("vendor rejected the message with status {status}")]
    Rejected {
        status: u16,
        detail: serde_json::Value,
    },
    #[error("vendor transport failed: {0}")]
    Transport(String),
}

impl ErrorCode for DispatchError {
    fn code(&self) -> u16 {
        match self {
            Self::Rejected { .. } => 3001,
            Self::Transport(_) => 3002,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "vendor_rejected",
            Self::Transport(_) => "vendor_unreachable",
        }
    }

    fn http_status(&self) -> u16 {
        502
    }
}

/// Fatal at startup, the service never runs with a broken configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("setting {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("Unable to read the `CONFIG` specified file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("contents of configuration file invalid: {0}")]
    Parse(#[from] toml::de::Error),
}
