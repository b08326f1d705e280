pub mod config;
pub mod config_scope;
pub mod model;
