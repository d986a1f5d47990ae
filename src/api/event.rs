use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use crate::model::auth::AuthUser;
use crate::model::event::{EventDetailResponse, EventForm, EventResponse, RegistrationStatusResponse};
use crate::model::global_error::AppError;
use crate::service::{event as event_service, registration as registration_service};

#[utoipa::path(
    get,
    path = "/api/events",
    summary = "이벤트 목록 조회",
    responses(
        (status = 200, description = "이벤트 목록 조회 성공 (일시 오름차순)", body = Vec<EventResponse>),
    ),
    tag = "events",
)]
#[get("/events")]
pub async fn list_events(
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let now = Utc::now();
    let events = event_service::list_all(db.get_ref()).await?;
    let response = event_service::with_counts(db.get_ref(), events, now).await?;

    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/api/events/upcoming",
    summary = "다가오는 이벤트 목록 조회",
    responses(
        (status = 200, description = "조회 성공", body = Vec<EventResponse>),
    ),
    tag = "events",
)]
#[get("/events/upcoming")]
pub async fn list_upcoming_events(
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let now = Utc::now();
    let events = event_service::list_upcoming(db.get_ref(), now).await?;
    let response = event_service::with_counts(db.get_ref(), events, now).await?;

    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    post,
    path = "/api/events",
    summary = "이벤트 생성",
    request_body = EventForm,
    responses(
        (status = 201, description = "이벤트 생성 성공", body = EventResponse),
        (status = 400, description = "유효성 검증 실패"),
        (status = 403, description = "주최자만 생성 가능"),
    ),
    tag = "events",
)]
#[post("/events")]
pub async fn create_event(
    body: web::Json<EventForm>,
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let event = event_service::create(db.get_ref(), &auth_user, &body).await?;

    Ok(HttpResponse::Created().json(EventResponse::new(event, 0, Utc::now())))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    summary = "이벤트 상세 조회",
    params(
        ("id" = i32, Path, description = "이벤트 ID", example = 1),
    ),
    responses(
        (status = 200, description = "이벤트 상세 조회 성공", body = EventDetailResponse),
        (status = 404, description = "이벤트 없음"),
    ),
    tag = "events",
)]
#[get("/events/{id}")]
pub async fn get_event(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let event_id = path.into_inner();
    let detail = event_service::detail(db.get_ref(), auth_user.user_id, event_id, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(detail))
}

#[utoipa::path(
    put,
    path = "/api/events/{id}",
    summary = "이벤트 수정",
    request_body = EventForm,
    params(
        ("id" = i32, Path, description = "이벤트 ID"),
    ),
    responses(
        (status = 200, description = "이벤트 수정 성공", body = EventResponse),
        (status = 403, description = "수정 권한 없음"),
        (status = 404, description = "이벤트 없음"),
    ),
    tag = "events",
)]
#[put("/events/{id}")]
pub async fn update_event(
    path: web::Path<i32>,
    body: web::Json<EventForm>,
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let event_id = path.into_inner();
    let updated = event_service::update(db.get_ref(), &auth_user, event_id, &body).await?;
    let count = registration_service::registration_count(db.get_ref(), event_id).await?;

    Ok(HttpResponse::Ok().json(EventResponse::new(updated, count, Utc::now())))
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    summary = "이벤트 삭제",
    params(
        ("id" = i32, Path, description = "이벤트 ID"),
    ),
    responses(
        (status = 204, description = "이벤트 삭제 성공"),
        (status = 403, description = "삭제 권한 없음"),
        (status = 404, description = "이벤트 없음"),
    ),
    tag = "events",
)]
#[delete("/events/{id}")]
pub async fn delete_event(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    event_service::delete(db.get_ref(), &auth_user, path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/registrations/count/{event_id}",
    summary = "참가 현황 조회",
    params(
        ("event_id" = i32, Path, description = "이벤트 ID"),
    ),
    responses(
        (status = 200, description = "조회 성공", body = RegistrationStatusResponse),
        (status = 404, description = "이벤트 없음"),
    ),
    tag = "registrations",
)]
#[get("/registrations/count/{event_id}")]
pub async fn registration_status(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let status = registration_service::status(db.get_ref(), path.into_inner(), Utc::now()).await?;

    Ok(HttpResponse::Ok().json(status))
}
