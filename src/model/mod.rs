pub mod auth;
pub mod dashboard;
pub mod event;
pub mod global_error;
pub mod notification;
pub mod registration;

pub use auth::{AuthUser, Claims, LoginRequest, RegisterRequest, UserResponse};
pub use global_error::{AppError, ErrorCode, ValidationFieldError};
