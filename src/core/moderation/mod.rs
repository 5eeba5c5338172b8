// Core moderation module - message purge planning.

pub mod purge;

pub use purge::*;
