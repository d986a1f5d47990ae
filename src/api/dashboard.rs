use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use crate::model::auth::AuthUser;
use crate::model::dashboard::DashboardResponse;
use crate::model::global_error::AppError;
use crate::service::dashboard as dashboard_service;

#[utoipa::path(
    get,
    path = "/api/dashboard",
    summary = "역할별 대시보드",
    responses(
        (status = 200, description = "주최자는 내 이벤트 요약, 참가자는 신청 내역", body = DashboardResponse),
    ),
    tag = "dashboard",
)]
#[get("/dashboard")]
pub async fn get_dashboard(
    db: web::Data<DatabaseConnection>,
    auth_user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let dashboard = dashboard_service::for_caller(db.get_ref(), &auth_user, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(dashboard))
}
