// Core profiles module - member profiles plus admin warnings and memos.

pub mod profile_models;
pub mod profile_service;

pub use profile_models::*;
pub use profile_service::*;
