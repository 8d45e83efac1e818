//! # Command Implementations
//!
//! Each submodule handles one CLI command (gallery, recognize, clean).

pub mod clean;
pub mod gallery;
pub mod recognize;
