use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use crate::model::auth::AuthUser;
use crate::model::global_error::AppError;
use crate::model::registration::RegistrationResponse;
use crate::service::registration as registration_service;

#[utoipa::path(
    post,
    path = "/api/events/{id}/register",
    summary = "이벤트 참가 신청",
    params(
        ("id" = i32, Path, description = "이벤트 ID"),
    ),
    responses(
        (status = 201, description = "참가 신청 성공", body = RegistrationResponse),
        (status = 404, description = "이벤트 없음"),
        (status = 409, description = "이미 신청함 / 마감 / 정원 초과"),
    ),
    tag = "registrations",
)]
#[post("/events/{id}/register")]
pub async fn register_for_event(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let registration = registration_service::register(db.get_ref(), auth_user.user_id, path.into_inner()).await?;

    Ok(HttpResponse::Created().json(RegistrationResponse::from(registration)))
}

#[utoipa::path(
    post,
    path = "/api/events/{id}/cancel",
    summary = "이벤트 참가 신청 취소",
    params(
        ("id" = i32, Path, description = "이벤트 ID"),
    ),
    responses(
        (status = 204, description = "취소 성공"),
        (status = 400, description = "신청 내역 없음"),
    ),
    tag = "registrations",
)]
#[post("/events/{id}/cancel")]
pub async fn cancel_registration(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    registration_service::cancel(db.get_ref(), auth_user.user_id, path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}
