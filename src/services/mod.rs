pub(crate) mod dispatch;
pub(crate) mod storage;
pub(crate) mod supervision;
pub(crate) mod workflow;
