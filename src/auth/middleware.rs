use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;

use super::jwt::{JwtUtils, TokenVerifyResult, ACCESS_TOKEN_COOKIE};
use crate::model::auth::AuthUser;
use crate::model::global_error::{AppError, ErrorCode};

/// Resolves the access token (Bearer header first, then cookie) into an `AuthUser`
/// request extension. Requests without a valid token never reach the inner service.
pub struct AuthMiddleware;

// 미들웨어 팩토리
impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(auth_user) => {
                req.extensions_mut().insert(auth_user);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(err) => Box::pin(async move { Err(err.into()) }),
        }
    }
}

fn authenticate(req: &ServiceRequest) -> Result<AuthUser, AppError> {
    let jwt = req
        .app_data::<web::Data<JwtUtils>>()
        .ok_or_else(|| AppError::internal_error(ErrorCode::InternalError))?;

    let token = bearer_token(req)
        .or_else(|| req.cookie(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| AppError::unauthorized(ErrorCode::AuthenticationFailed))?;

    match jwt.verify_token(&token) {
        TokenVerifyResult::Valid(claims) => claims
            .auth_user()
            .ok_or_else(|| AppError::unauthorized(ErrorCode::InvalidAuthToken)),
        TokenVerifyResult::Expired => Err(AppError::unauthorized(ErrorCode::ExpiredAuthToken)),
        TokenVerifyResult::Invalid => Err(AppError::unauthorized(ErrorCode::InvalidAuthToken)),
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    header.strip_prefix("Bearer ").map(|token| token.trim().to_string())
}
