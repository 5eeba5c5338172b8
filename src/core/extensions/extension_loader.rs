// Extension loading - command modules are registered from a static list.
//
// Every command module exposes one `Extension` entry; the loader calls each
// entry's registration function, collects the commands and records failures
// per module without aborting the pass. `discover` walks a command source
// tree and lists the modules it contains so tests can check the static
// list against the files on disk.

use std::collections::{BTreeMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use thiserror::Error;

/// File that turns a directory into one grouped module.
pub const INITIALIZER_FILE: &str = "mod.rs";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtensionError {
    #[error("extension `{0}` is already loaded")]
    AlreadyLoaded(String),

    #[error("extension registered no commands")]
    Empty,

    #[error("command `{0}` is already registered by another extension")]
    DuplicateCommand(String),

    #[error("registration panicked: {0}")]
    Panicked(String),
}

/// Anything with a command name the loader can check for duplicates.
pub trait NamedCommand {
    fn command_name(&self) -> &str;
}

/// One command module.
pub struct Extension<C> {
    /// Qualified module name, e.g. `commands::purge`.
    pub name: &'static str,
    pub register: fn() -> Vec<C>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failed: BTreeMap<String, String>,
}

pub struct ExtensionLoader<C> {
    commands: Vec<C>,
    command_names: HashSet<String>,
    report: LoadReport,
}

impl<C: NamedCommand> Default for ExtensionLoader<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NamedCommand> ExtensionLoader<C> {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            command_names: HashSet::new(),
            report: LoadReport::default(),
        }
    }

    /// Load a single extension. On failure nothing from it is attached.
    pub fn load_extension(&mut self, extension: &Extension<C>) -> Result<(), ExtensionError> {
        let result = self.try_load(extension);

        match &result {
            Ok(()) => self.report.loaded.push(extension.name.to_string()),
            Err(e) => {
                tracing::error!(extension = extension.name, error = %e, "Failed to load extension");
                self.report
                    .failed
                    .insert(extension.name.to_string(), e.to_string());
            }
        }
        result
    }

    fn try_load(&mut self, extension: &Extension<C>) -> Result<(), ExtensionError> {
        if self.report.loaded.iter().any(|n| n == extension.name) {
            return Err(ExtensionError::AlreadyLoaded(extension.name.to_string()));
        }

        let commands = catch_unwind(AssertUnwindSafe(extension.register))
            .map_err(|payload| ExtensionError::Panicked(panic_message(payload.as_ref())))?;

        if commands.is_empty() {
            return Err(ExtensionError::Empty);
        }

        let mut batch = HashSet::new();
        for command in &commands {
            let name = command.command_name();
            if self.command_names.contains(name) || !batch.insert(name.to_string()) {
                return Err(ExtensionError::DuplicateCommand(name.to_string()));
            }
        }

        self.command_names.extend(batch);
        self.commands.extend(commands);
        Ok(())
    }

    /// Load every extension; failures are collected, not fatal.
    pub fn load_all(&mut self, extensions: &[Extension<C>]) -> &LoadReport {
        for extension in extensions {
            let _ = self.load_extension(extension);
        }
        &self.report
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn into_commands(self) -> Vec<C> {
        self.commands
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// List the command modules under `root`, sorted.
///
/// A subdirectory holding an initializer file is one grouped module and is
/// not descended into. Any other `.rs` file is its own module. Names start
/// with the root directory's name and are joined with `::`.
pub fn discover(root: &Path) -> std::io::Result<Vec<String>> {
    let prefix = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut modules = Vec::new();
    walk(root, &prefix, &mut modules)?;
    modules.sort();
    Ok(modules)
}

fn walk(dir: &Path, qualified: &str, modules: &mut Vec<String>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if name.starts_with('.') || name.starts_with('_') {
            continue;
        }

        if path.is_dir() {
            let child = format!("{}::{}", qualified, name);
            if path.join(INITIALIZER_FILE).is_file() {
                modules.push(child);
            } else {
                walk(&path, &child, modules)?;
            }
        } else if name != INITIALIZER_FILE {
            if let Some(stem) = name.strip_suffix(".rs") {
                modules.push(format!("{}::{}", qualified, stem));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Cmd(&'static str);

    impl NamedCommand for Cmd {
        fn command_name(&self) -> &str {
            self.0
        }
    }

    fn touch(path: &Path) {
        fs::write(path, "// module\n").unwrap();
    }

    #[test]
    fn discovers_group_and_loose_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("commands");
        let group = root.join("reaction");
        fs::create_dir_all(&group).unwrap();

        touch(&root.join("purge.rs"));
        touch(&root.join("memo.rs"));
        touch(&group.join(INITIALIZER_FILE));
        touch(&group.join("add.rs"));
        touch(&group.join("remove.rs"));

        let modules = discover(&root).unwrap();
        assert_eq!(
            modules,
            vec!["commands::memo", "commands::purge", "commands::reaction"]
        );
    }

    #[test]
    fn skips_hidden_and_non_rust_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("commands");
        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::create_dir_all(root.join("nested")).unwrap();

        touch(&root.join(INITIALIZER_FILE));
        touch(&root.join("_private.rs"));
        touch(&root.join("notes.txt"));
        touch(&root.join(".cache").join("x.rs"));
        touch(&root.join("nested").join("deep.rs"));

        let modules = discover(&root).unwrap();
        assert_eq!(modules, vec!["commands::nested::deep"]);
    }

    fn two() -> Vec<Cmd> {
        vec![Cmd("a"), Cmd("b")]
    }

    fn clashes() -> Vec<Cmd> {
        vec![Cmd("b")]
    }

    fn empty() -> Vec<Cmd> {
        Vec::new()
    }

    fn explodes() -> Vec<Cmd> {
        panic!("bad registration")
    }

    fn third() -> Vec<Cmd> {
        vec![Cmd("c")]
    }

    #[test]
    fn failures_are_collected_without_aborting() {
        let extensions = [
            Extension { name: "commands::two", register: two },
            Extension { name: "commands::clashes", register: clashes },
            Extension { name: "commands::empty", register: empty },
            Extension { name: "commands::explodes", register: explodes },
            Extension { name: "commands::third", register: third },
        ];

        let mut loader = ExtensionLoader::new();
        let report = loader.load_all(&extensions).clone();

        assert_eq!(report.loaded, vec!["commands::two", "commands::third"]);
        assert_eq!(report.failed.len(), 3);
        assert!(report.failed["commands::clashes"].contains("`b`"));
        assert!(report.failed["commands::explodes"].contains("bad registration"));

        let names: Vec<_> = loader
            .into_commands()
            .iter()
            .map(|c| c.command_name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn loading_twice_is_rejected() {
        let ext = Extension { name: "commands::third", register: third };
        let mut loader = ExtensionLoader::new();

        assert!(loader.load_extension(&ext).is_ok());
        assert_eq!(
            loader.load_extension(&ext),
            Err(ExtensionError::AlreadyLoaded("commands::third".to_string()))
        );
    }
}
