//! Single request/response exchange: templates, clients and the send primitive.
mod client;
mod result;
mod send;
mod sender;
mod template;


pub use client::{ClientTuning, DEFAULT_TIMEOUT, build_client};
pub use result::RequestResult;
pub use send::send;
pub use sender::{ClientSender, FnSender, RequestSender};
pub use template::RequestTemplate;

pub(crate) use client::USER_AGENT;
