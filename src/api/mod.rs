pub(crate) mod auth;
pub(crate) mod chapters;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod notifications;
pub(crate) mod pagination;
pub(crate) mod people;
pub(crate) mod periods;
pub(crate) mod proposals;
pub(crate) mod reports;
pub(crate) mod router;
pub(crate) mod validation;
