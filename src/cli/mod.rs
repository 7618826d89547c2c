mod migrate;
mod server;
mod submit;

pub use migrate::*;
pub use server::*;
pub use submit::*;
