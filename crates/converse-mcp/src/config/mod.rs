//! Configuration loading and resolution.

use std::path::PathBuf;

/// Environment variable consulted for the log filter when no flag is given.
pub const LOG_ENV: &str = "CONVERSE_LOG";
/// Environment variable naming the directory served as file resources.
pub const ROOT_ENV: &str = "CONVERSE_ROOT";

const DEFAULT_LOG_LEVEL: &str = "info";

/// Resolve the log filter: explicit flag, then `CONVERSE_LOG`, then `info`.
pub fn resolve_log_level(explicit: Option<&str>) -> String {
    resolve_with(explicit, std::env::var(LOG_ENV).ok())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// Resolve the resource root: explicit flag, then `CONVERSE_ROOT`. `None`
/// means no file resources are served.
pub fn resolve_resource_root(explicit: Option<&str>) -> Option<PathBuf> {
    resolve_with(explicit, std::env::var(ROOT_ENV).ok()).map(PathBuf::from)
}

fn resolve_with(explicit: Option<&str>, env: Option<String>) -> Option<String> {
    if let Some(value) = explicit {
        return Some(value.to_string());
    }
    env.filter(|v| !v.trim().is_empty())
}
