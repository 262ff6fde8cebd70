//! Configuration parsing for dappack
//!
//! This crate handles parsing of:
//! - Global configuration (`~/.config/dappack/config.toml`)
//! - Dapp descriptors (the `nixpacks.toml` documents served by the registry)

mod descriptor;
mod error;
mod global;

pub use descriptor::*;
pub use error::*;
pub use global::*;
