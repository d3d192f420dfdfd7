//! Build metadata for the running binary, populated by `build.rs`.
//!
//! Version labels:
//! - Local/Test: `main:{commit}`
//! - Prod: `stable:{version}`

/// Environment the services determine at runtime from `ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    /// Developer machine
    Local,
    /// CI and shared test deployments
    Test,
    /// Production
    Prod,
}

/// Get the build date in RFC3339 format
pub fn build_date() -> &'static str {
    env!("BUILD_DATE")
}

/// Get the git commit hash (short)
pub fn build_commit() -> &'static str {
    env!("BUILD_COMMIT")
}

/// Get the package version
pub fn build_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Format the version label reported for `env`.
pub fn format_version_for_runtime_env(env: RuntimeEnv) -> String {
    match env {
        RuntimeEnv::Local | RuntimeEnv::Test => format!("main:{}", build_commit()),
        RuntimeEnv::Prod => format!("stable:{}", build_version()),
    }
}
