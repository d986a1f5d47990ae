use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // 400 BAD REQUEST
    ValidationError,
    InvalidEmailPwd,
    NotRefreshToken,
    InvalidRefreshToken,
    NotRegistered,

    // 401 UNAUTHORIZED
    AuthenticationFailed,
    ExpiredAuthToken,
    InvalidAuthToken,

    // 403 FORBIDDEN
    NotEnoughPermission,
    OrganizerOnly,

    // 404 NOT FOUND
    MemberNotFound,
    EventNotFound,
    NotificationNotFound,

    // 409 CONFLICT
    DuplicateAccount,
    AlreadyRegistered,
    RegistrationClosed,
    EventFull,
    OrganizerHasEvents,

    // 500 SERVER ERRORS
    DatabaseError,
    InternalError,
    TokenGenerationFailed,
}

impl ErrorCode {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "유효성 검증에 실패했습니다",
            ErrorCode::InvalidEmailPwd => "잘못된 자격 증명입니다",
            ErrorCode::NotRefreshToken => "잘못된 리프레시 토큰입니다",
            ErrorCode::InvalidRefreshToken => "리프레시 토큰이 유효하지 않습니다",
            ErrorCode::NotRegistered => "참가 신청하지 않은 이벤트입니다",

            ErrorCode::AuthenticationFailed => "인증에 실패했습니다",
            ErrorCode::ExpiredAuthToken => "로그인 토큰이 만료되었습니다",
            ErrorCode::InvalidAuthToken => "유효하지 않은 로그인 토큰입니다",

            ErrorCode::NotEnoughPermission => "권한이 부족합니다",
            ErrorCode::OrganizerOnly => "주최자만 이벤트를 만들 수 있습니다",

            ErrorCode::MemberNotFound => "사용자를 찾을 수 없습니다",
            ErrorCode::EventNotFound => "유효하지 않은 이벤트 ID입니다",
            ErrorCode::NotificationNotFound => "알림을 찾을 수 없습니다",

            ErrorCode::DuplicateAccount => "이미 사용 중인 사용자명 또는 이메일입니다",
            ErrorCode::AlreadyRegistered => "이미 참가 신청한 이벤트입니다",
            ErrorCode::RegistrationClosed => "참가 신청이 마감된 이벤트입니다",
            ErrorCode::EventFull => "정원이 가득 찬 이벤트입니다",
            ErrorCode::OrganizerHasEvents => "주최 중인 이벤트가 있어 계정을 삭제할 수 없습니다",

            ErrorCode::DatabaseError => "데이터베이스 오류가 발생했습니다",
            ErrorCode::InternalError => "내부 서버 오류가 발생했습니다",
            ErrorCode::TokenGenerationFailed => "토큰 생성에 실패했습니다",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError |
            ErrorCode::InvalidEmailPwd |
            ErrorCode::NotRefreshToken |
            ErrorCode::InvalidRefreshToken |
            ErrorCode::NotRegistered => StatusCode::BAD_REQUEST,

            ErrorCode::AuthenticationFailed |
            ErrorCode::ExpiredAuthToken |
            ErrorCode::InvalidAuthToken => StatusCode::UNAUTHORIZED,

            ErrorCode::NotEnoughPermission |
            ErrorCode::OrganizerOnly => StatusCode::FORBIDDEN,

            ErrorCode::MemberNotFound |
            ErrorCode::EventNotFound |
            ErrorCode::NotificationNotFound => StatusCode::NOT_FOUND,

            ErrorCode::DuplicateAccount |
            ErrorCode::AlreadyRegistered |
            ErrorCode::RegistrationClosed |
            ErrorCode::EventFull |
            ErrorCode::OrganizerHasEvents => StatusCode::CONFLICT,

            ErrorCode::DatabaseError |
            ErrorCode::InternalError |
            ErrorCode::TokenGenerationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationFieldError {
    pub field: String,
    pub message: String,
}

impl ValidationFieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    ApiError(ErrorCode, Option<String>),

    #[error("유효성 검증에 실패했습니다: {0:?}")]
    ValidationError(Vec<ValidationFieldError>),

    #[error("데이터베이스 오류: {0}")]
    Database(#[from] DbErr),
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        AppError::ApiError(code, None)
    }

    pub fn with_detail(code: ErrorCode, detail: impl Into<String>) -> Self {
        AppError::ApiError(code, Some(detail.into()))
    }

    pub fn bad_request(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn unauthorized(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn forbidden(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn not_found(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::with_detail(code, detail)
    }

    pub fn internal_error(code: ErrorCode) -> Self {
        Self::new(code)
    }

    pub fn invalid_field(field: &str, message: &str) -> Self {
        AppError::ValidationError(vec![ValidationFieldError::new(field, message)])
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::ApiError(code, _) => *code,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
            AppError::Database(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            AppError::ApiError(_, detail) => detail.as_deref(),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::error!("토큰 생성 실패: {}", err);
        AppError::internal_error(ErrorCode::TokenGenerationFailed)
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ValidationFieldError>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.code().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let code = self.code();
        let (detail, errors) = match self {
            AppError::ApiError(_, detail) => (detail.clone(), Vec::new()),
            AppError::ValidationError(errors) => (None, errors.clone()),
            AppError::Database(err) => {
                tracing::error!("데이터베이스 오류 발생: {}", err);
                (None, Vec::new())
            }
        };

        HttpResponse::build(code.status_code())
            .json(ErrorResponse {
                code: format!("{:?}", code),
                message: code.message().to_string(),
                detail,
                errors,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_rule_failures_map_to_conflict() {
        for code in [ErrorCode::AlreadyRegistered, ErrorCode::RegistrationClosed, ErrorCode::EventFull] {
            assert_eq!(code.status_code(), StatusCode::CONFLICT);
        }
        assert_eq!(ErrorCode::NotRegistered.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_errors_report_validation_code() {
        let err = AppError::invalid_field("title", "제목은 필수입니다.");
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_errors_surface_as_internal() {
        let err: AppError = DbErr::Custom("boom".into()).into();
        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert_eq!(err.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn detail_carries_event_title() {
        let err = AppError::conflict(ErrorCode::EventFull, "Rust Meetup");
        assert_eq!(err.detail(), Some("Rust Meetup"));
        assert_eq!(err.to_string(), ErrorCode::EventFull.message());
    }
}
