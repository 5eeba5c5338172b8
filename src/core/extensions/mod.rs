// Core extensions module - static command registry and its loader.

pub mod extension_loader;

pub use extension_loader::*;
