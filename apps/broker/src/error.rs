use actix_web::error::ResponseError;
use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::ErrorCode;
use crate::trace_ctx;

/// Detail shown for internal errors when debug mode is off.
pub const GENERIC_INTERNAL_DETAIL: &str = "An error occurred";

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {detail}")]
    Unauthorized { code: ErrorCode, detail: String },
    #[error("Forbidden: {detail}")]
    Forbidden { code: ErrorCode, detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Payload too large: {detail}")]
    PayloadTooLarge { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Unauthorized { code, .. } => *code,
            AppError::Forbidden { code, .. } => *code,
            AppError::BadRequest { code, .. } => *code,
            AppError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            AppError::Internal { .. } => ErrorCode::Internal,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            AppError::Unauthorized { detail, .. }
            | AppError::Forbidden { detail, .. }
            | AppError::BadRequest { detail, .. }
            | AppError::PayloadTooLarge { detail }
            | AppError::Internal { detail }
            | AppError::Config { detail } => detail,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unauthorized_missing_bearer() -> Self {
        Self::Unauthorized {
            code: ErrorCode::UnauthorizedMissingBearer,
            detail: "Missing or malformed Bearer token".to_string(),
        }
    }

    pub fn forbidden_invalid_token() -> Self {
        Self::Forbidden {
            code: ErrorCode::ForbiddenInvalidToken,
            detail: "Forbidden - Invalid token".to_string(),
        }
    }

    pub fn forbidden_target() -> Self {
        Self::Forbidden {
            code: ErrorCode::ForbiddenTarget,
            detail: "Forbidden - Target not allowed".to_string(),
        }
    }

    pub fn forbidden_client() -> Self {
        Self::Forbidden {
            code: ErrorCode::ForbiddenClient,
            detail: "Forbidden - Client not allowed".to_string(),
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::PayloadTooLarge {
            detail: format!("Request body exceeds {limit} bytes"),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    /// Replace internal detail with a generic message unless `debug` is set.
    ///
    /// Non-internal errors pass through untouched; their details are part of
    /// the API contract.
    pub fn redact_unless(self, debug: bool) -> Self {
        match self {
            AppError::Internal { .. } | AppError::Config { .. } if !debug => {
                AppError::internal(GENERIC_INTERNAL_DETAIL)
            }
            other => other,
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().as_str();
        let trace_id = trace_ctx::trace_id();

        let problem_details = ProblemDetails {
            type_: format!("urn:vnf-broker:error:{}", code.to_lowercase()),
            title: Self::humanize_code(code),
            status: status.as_u16(),
            detail: self.detail().to_string(),
            code: code.to_string(),
            trace_id: trace_id.clone(),
        };

        let mut builder = HttpResponse::build(status);
        builder
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id));
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(problem_details)
    }
}
