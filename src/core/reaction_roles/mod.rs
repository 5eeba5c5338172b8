// Core reaction-role module - registry plus the grant/revoke rules.

pub mod reaction_role_models;
pub mod reaction_role_service;

pub use reaction_role_models::*;
pub use reaction_role_service::*;
