//! YAML rendering for normalized data.
//!
//! Rendering is two stages: serialize with `serde_yaml`, then rewrite any
//! explicitly tagged wildcard key (`! '*'`) to the plain quoted form, which
//! is the only form salt accepts for a literal `*` target.

use std::sync::LazyLock;

use regex::Regex;

use super::normalize::NormalizedData;
use crate::error::{Result, SandboxError};

static TAGGED_WILDCARD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"! '\*'").unwrap());

/// Serialize `data` to YAML text with the wildcard-key fix applied.
///
/// `what` names the value in error messages (e.g. `pillar users`).
pub fn serialize(data: &NormalizedData, what: &str) -> Result<String> {
    let text =
        serde_yaml::to_string(data.as_value()).map_err(|source| SandboxError::Serialization {
            what: what.to_string(),
            source,
        })?;
    Ok(fix_wildcard_keys(&text))
}

/// Replace every `! '*'` with `'*'`.
pub fn fix_wildcard_keys(text: &str) -> String {
    TAGGED_WILDCARD.replace_all(text, "'*'").into_owned()
}
