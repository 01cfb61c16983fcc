use serde::Serialize;

pub(crate) mod auth;
pub(crate) mod chapter;
pub(crate) mod completion;
pub(crate) mod message;
pub(crate) mod notification;
pub(crate) mod period;
pub(crate) mod person;
pub(crate) mod proposal;
pub(crate) mod report;

/// Component statuses are plain strings so a failing dependency can carry
/// its error text.
#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: &'static str,
    pub(crate) status: &'static str,
    pub(crate) database: String,
    pub(crate) redis: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
    pub(crate) docs_url: String,
}
