// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "extensions/mod.rs"]
pub mod extensions;

#[path = "lifecycle/shutdown.rs"]
pub mod lifecycle;

#[path = "logging/mod.rs"]
pub mod logging;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "profiles/mod.rs"]
pub mod profiles;

#[path = "reaction_roles/mod.rs"]
pub mod reaction_roles;
