//! Shared utilities for the DropVault workspace.
//!
//! Currently only build metadata, used by the services crate to stamp
//! its health responses.

pub mod version_info;
