//! Business rules for events, registrations and notifications.
//!
//! Every operation takes the caller's identity explicitly and runs its writes in a single
//! database transaction.

pub mod dashboard;
pub mod event;
pub mod notification;
pub mod registration;
pub mod user;
