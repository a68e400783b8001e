//! HTTP liveness probing of service health endpoints

mod http;

pub use http::HttpProber;
