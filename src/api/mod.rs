mod auth;
mod dashboard;
mod event;
mod health;
mod notification;
mod registration;

use actix_web::web;
use utoipa::OpenApi;
use crate::auth::AuthMiddleware;

pub use crate::api::auth::{register, login, refresh_token, get_me, delete_me};
pub use crate::api::dashboard::get_dashboard;
pub use crate::api::event::{list_events, list_upcoming_events, create_event, get_event, update_event, delete_event, registration_status};
pub use crate::api::health::health_check;
pub use crate::api::notification::{list_notifications, mark_notification_read, unread_notifications_count};
pub use crate::api::registration::{register_for_event, cancel_registration};

#[derive(OpenApi)]
#[openapi(
    info(title = "rusty-rsvp", description = "이벤트 등록 서비스 API"),
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::refresh_token,
        auth::get_me,
        auth::delete_me,
        event::list_events,
        event::list_upcoming_events,
        event::create_event,
        event::get_event,
        event::update_event,
        event::delete_event,
        event::registration_status,
        registration::register_for_event,
        registration::cancel_registration,
        notification::list_notifications,
        notification::mark_notification_read,
        notification::unread_notifications_count,
        dashboard::get_dashboard,
    ),
    tags(
        (name = "auth", description = "회원 가입 / 로그인"),
        (name = "events", description = "이벤트 관리"),
        (name = "registrations", description = "참가 신청"),
        (name = "notifications", description = "알림"),
        (name = "dashboard", description = "대시보드"),
    ),
)]
pub struct ApiDoc;

/// Public endpoints at the root, everything else under `/api` behind [`AuthMiddleware`].
///
/// Literal paths like `/events/upcoming` are registered before `/events/{id}`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(register)
        .service(login)
        .service(refresh_token)
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware)
                .service(get_me)
                .service(delete_me)
                .service(list_upcoming_events)
                .service(list_events)
                .service(create_event)
                .service(get_event)
                .service(update_event)
                .service(delete_event)
                .service(register_for_event)
                .service(cancel_registration)
                .service(registration_status)
                .service(unread_notifications_count)
                .service(list_notifications)
                .service(mark_notification_read)
                .service(get_dashboard),
        );
}
