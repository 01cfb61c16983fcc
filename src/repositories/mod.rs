pub(crate) mod activity;
pub(crate) mod archives;
pub(crate) mod cards;
pub(crate) mod chapters;
pub(crate) mod messages;
pub(crate) mod notifications;
pub(crate) mod people;
pub(crate) mod periods;
pub(crate) mod proposals;
pub(crate) mod reports;
