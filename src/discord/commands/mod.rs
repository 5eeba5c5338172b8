// Slash command modules.
//
// Each file (or directory with a mod.rs) under this folder is one extension
// and must have an entry in `extensions()`. A test checks the list against
// the files on disk.

use crate::core::extensions::Extension;
use crate::discord::Command;

pub mod delete;
pub mod log_channel;
pub mod memo;
pub mod profile;
pub mod purge;
pub mod reaction;
pub mod warnings;

pub fn extensions() -> Vec<Extension<Command>> {
    vec![
        Extension {
            name: "commands::delete",
            register: || vec![delete::delete_message()],
        },
        Extension {
            name: "commands::log_channel",
            register: || vec![log_channel::log_channel()],
        },
        Extension {
            name: "commands::memo",
            register: || vec![memo::memo()],
        },
        Extension {
            name: "commands::profile",
            register: || vec![profile::register(), profile::profiles(), profile::info()],
        },
        Extension {
            name: "commands::purge",
            register: || vec![purge::purge()],
        },
        Extension {
            name: "commands::reaction",
            register: || vec![reaction::reaction()],
        },
        Extension {
            name: "commands::warnings",
            register: || vec![warnings::add_warning(), warnings::remove_warning()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extensions::{discover, ExtensionLoader};
    use std::path::Path;

    #[test]
    fn test_registry_matches_source_tree() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("src")
            .join("discord")
            .join("commands");

        let on_disk = discover(&root).unwrap();
        let mut registered: Vec<String> =
            extensions().iter().map(|e| e.name.to_string()).collect();
        registered.sort();

        assert_eq!(on_disk, registered);
    }

    #[test]
    fn test_every_extension_loads() {
        let mut loader = ExtensionLoader::new();
        let report = loader.load_all(&extensions()).clone();

        assert!(report.failed.is_empty(), "failed: {:?}", report.failed);
        assert_eq!(report.loaded.len(), extensions().len());

        let names: Vec<String> = loader
            .into_commands()
            .iter()
            .map(|c| c.name.clone())
            .collect();
        assert!(names.contains(&"reaction".to_string()));
        assert!(names.contains(&"purge".to_string()));
    }
}
