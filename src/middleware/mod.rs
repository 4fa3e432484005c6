mod client_ip;
mod json_error;
mod panic;

pub use client_ip::ClientIp;
pub use json_error::json_error_middleware;
pub use panic::catch_panic_layer;
