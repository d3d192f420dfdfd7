//! Server-rendered pages.

pub mod error;
