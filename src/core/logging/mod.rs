// Core logging module - server settings plus the events relayed to the log channel.

pub mod logging_models;
pub mod logging_service;

pub use logging_models::*;
pub use logging_service::*;
