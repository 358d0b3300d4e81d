//! Environment variable expansion for site configuration strings.
//!
//! Only the braced forms are recognised:
//! - `${VAR}` - value of VAR, error if unset
//! - `${VAR:-default}` - value of VAR if set, otherwise `default`

use crate::ConfigError;

/// Expand `${VAR}` references in `value`.
///
/// `field` names the config key being expanded and ends up in the error.
/// Values without `${` are returned as is, so a URL with a bare `$` survives.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var)
            .map(Some)
            .map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.0),
    })
}

/// Lookup failure carrying the unset variable name.
struct UnsetVar(String);
