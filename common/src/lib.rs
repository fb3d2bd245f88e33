//! Models shared between the signature service and its clients.

pub mod model;
pub mod notifications;
pub mod requests;
