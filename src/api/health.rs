use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;
use crate::model::global_error::AppError;

#[utoipa::path(
    get,
    path = "/health-check",
    responses(
        (status = 200, description = "서버와 데이터베이스가 정상 동작 중", body = String),
        (status = 500, description = "데이터베이스 연결 실패"),
    ),
    tag = "health check",
)]
#[get("/health-check")]
pub async fn health_check(
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    db.ping().await?;

    Ok(HttpResponse::Ok().body("OK"))
}
