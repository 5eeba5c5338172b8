// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

pub mod database;

#[path = "logging/sqlite_store.rs"]
pub mod logging;

#[path = "profiles/sqlite_profile_store.rs"]
pub mod profiles;

#[path = "reaction_roles/sqlite_reaction_store.rs"]
pub mod reaction_roles;
