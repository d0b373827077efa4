//! Port traits: the narrow contracts the core uses to reach the outside.

pub mod config_port;
pub mod data_port;
pub mod news_port;
