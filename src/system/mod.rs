pub(crate) mod banner;
pub(crate) mod logger;
pub(crate) mod summary_output;
