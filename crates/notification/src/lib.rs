mod dispatch;
mod service;

pub use dispatch::*;
pub use service::*;
