pub mod app_context;
pub mod auth;
pub mod common;
pub mod config;
pub mod database;
pub mod errors;
pub mod integrations;
pub mod services;
pub mod storage;

#[cfg(feature = "graphql")]
pub mod graphql;
#[cfg(feature = "server")]
pub mod server;
