pub mod event;
pub mod notification;
pub mod registration;
pub mod user;
