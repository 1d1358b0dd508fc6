pub mod codegen;
pub mod config;
pub mod execution;
pub mod guard;
pub mod models;
