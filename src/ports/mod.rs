//! Port traits implemented by [`crate::adapters`].

pub mod config_port;
pub mod data_port;
pub mod session_port;
