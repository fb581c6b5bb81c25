//! Configuration loading and resolution for the `pounce` binary.
//!
//! `load` is the entry point: it layers default config files, explicit
//! `--config` files, and `POUNCE__`-prefixed environment variables, applies
//! CLI overrides, and validates the result into a [`ResolvedConfig`].

mod loader;
mod raw;
mod resolved;
mod sources;

pub(crate) use loader::load;
pub(crate) use resolved::ResolvedConfig;
