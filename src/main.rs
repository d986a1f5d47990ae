use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenv::dotenv;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use rusty_rsvp::api::{configure_routes, ApiDoc};
use rusty_rsvp::auth::JwtUtils;
use rusty_rsvp::configuration::Settings;
use rusty_rsvp::db::init_db_with_migrations;
use rusty_rsvp::service::user as user_service;
use rusty_rsvp::telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let settings = Settings::from_env()?;

    let subscriber = get_subscriber(
        "rusty_rsvp".into(),
        settings.log_filter.clone(),
        std::io::stdout
    );
    init_subscriber(subscriber)?;

    info!("애플리케이션 시작 중...");

    let db = init_db_with_migrations(&settings.database).await?;

    if let Some(organizer) = &settings.default_organizer {
        user_service::ensure_default_organizer(&db, organizer).await?;
    }

    let db_data = Data::new(db);
    let jwt_data = Data::new(JwtUtils::new(settings.jwt_secret.clone()));
    let openapi = ApiDoc::openapi();

    let address = (settings.application.host.clone(), settings.application.port);
    info!("서버 시작 중: http://{}:{}", address.0, address.1);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(db_data.clone())
            .app_data(jwt_data.clone())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(configure_routes)
    })
        .bind(address)?
        .run()
        .await?;

    Ok(())
}
