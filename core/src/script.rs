//! Default voir dire outline shown in the script pane.

/// Loaded by new workspaces and restored by `reset_script`.
pub const DEFAULT_SCRIPT: &str = include_str!("../assets/voir_dire.md");
