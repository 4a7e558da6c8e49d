//! Minion configuration rendering.

/// Name of the state-top file the minion config points at.
pub const STATE_TOP_FILE: &str = "top.sls";

/// Render the masterless minion config.
///
/// `file_root` and `pillar_root` are paths on the target host (the sandbox
/// location joined with the configured roots), not sandbox-local paths.
pub fn render_minion_config(environment: &str, file_root: &str, pillar_root: &str) -> String {
    format!(
        "state_top: {STATE_TOP_FILE}\n\
         \n\
         file_client: local\n\
         \n\
         file_roots:\n \
         {environment}:\n   \
         - {file_root}\n\
         \n\
         pillar_roots:\n \
         {environment}:\n   \
         - {pillar_root}\n"
    )
}
