//! Store backend implementations.

pub mod http;
