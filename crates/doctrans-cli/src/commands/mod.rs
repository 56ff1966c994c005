pub mod config;
pub mod connection;
pub mod engine;
pub mod runtime;
pub mod translate;
