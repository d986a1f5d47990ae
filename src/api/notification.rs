use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use crate::model::auth::AuthUser;
use crate::model::global_error::AppError;
use crate::model::notification::{MarkReadResponse, NotificationResponse, UnreadCountResponse};
use crate::service::notification as notification_service;

#[utoipa::path(
    get,
    path = "/api/notifications",
    summary = "내 알림 목록 (최신순)",
    responses(
        (status = 200, description = "조회 성공", body = Vec<NotificationResponse>),
    ),
    tag = "notifications",
)]
#[get("/notifications")]
pub async fn list_notifications(
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let notifications = notification_service::list_for_user(db.get_ref(), auth_user.user_id).await?;

    let response: Vec<NotificationResponse> = notifications
        .into_iter()
        .map(NotificationResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    summary = "알림 읽음 처리",
    params(
        ("id" = i32, Path, description = "알림 ID"),
    ),
    responses(
        (status = 200, description = "처리 성공", body = MarkReadResponse),
        (status = 403, description = "다른 사용자의 알림"),
        (status = 404, description = "알림 없음"),
    ),
    tag = "notifications",
)]
#[post("/notifications/{id}/read")]
pub async fn mark_notification_read(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    notification_service::mark_read(db.get_ref(), auth_user.user_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(MarkReadResponse { success: true }))
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    summary = "읽지 않은 알림 수",
    responses(
        (status = 200, description = "조회 성공", body = UnreadCountResponse),
    ),
    tag = "notifications",
)]
#[get("/notifications/unread-count")]
pub async fn unread_notifications_count(
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let count = notification_service::unread_count(db.get_ref(), auth_user.user_id).await?;

    Ok(HttpResponse::Ok().json(UnreadCountResponse { count }))
}
