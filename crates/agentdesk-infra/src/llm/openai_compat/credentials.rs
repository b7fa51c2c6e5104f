//! Bearer credential resolution.
//!
//! The credential comes from a priority-ordered list of environment variable
//! names; the first one that is set and non-empty wins.

use secrecy::SecretString;

use agentdesk_types::error::ConfigurationError;

/// Read access to named variables.
///
/// The process environment in production; a map in tests.
pub trait VarLookup {
    fn var(&self, name: &str) -> Option<String>;
}

/// [`VarLookup`] over the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl VarLookup for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        match std::env::var(name) {
            Ok(val) => Some(val),
            Err(std::env::VarError::NotPresent) => None,
            // Present but not valid Unicode: unusable as a header value.
            Err(std::env::VarError::NotUnicode(_)) => None,
        }
    }
}

impl VarLookup for std::collections::HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// A credential and the variable it came from.
pub struct ResolvedCredential {
    pub source: String,
    pub secret: SecretString,
}

/// Resolve the first non-empty variable in `names`.
///
/// # Errors
///
/// `ConfigurationError::MissingCredential` listing every name checked.
pub fn resolve_credential(
    names: &[String],
    lookup: &impl VarLookup,
) -> Result<ResolvedCredential, ConfigurationError> {
    for name in names {
        if let Some(value) = lookup.var(name) {
            let value = value.trim();
            if !value.is_empty() {
                return Ok(ResolvedCredential {
                    source: name.clone(),
                    secret: SecretString::from(value.to_string()),
                });
            }
        }
    }

    Err(ConfigurationError::MissingCredential {
        checked: names.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn names() -> Vec<String> {
        vec!["DASHSCOPE_API_KEY".to_string(), "QWEN_API_KEY".to_string()]
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_primary_wins_over_fallback() {
        let env = vars(&[("DASHSCOPE_API_KEY", "primary"), ("QWEN_API_KEY", "fallback")]);
        let cred = resolve_credential(&names(), &env).unwrap();
        assert_eq!(cred.source, "DASHSCOPE_API_KEY");
        assert_eq!(cred.secret.expose_secret(), "primary");
    }

    #[test]
    fn test_fallback_used_when_primary_missing_or_blank() {
        for env in [
            vars(&[("QWEN_API_KEY", "fallback")]),
            vars(&[("DASHSCOPE_API_KEY", "  "), ("QWEN_API_KEY", "fallback")]),
        ] {
            let cred = resolve_credential(&names(), &env).unwrap();
            assert_eq!(cred.source, "QWEN_API_KEY");
            assert_eq!(cred.secret.expose_secret(), "fallback");
        }
    }

    #[test]
    fn test_none_set_is_configuration_error() {
        let err = resolve_credential(&names(), &HashMap::new()).err().unwrap();
        match err {
            ConfigurationError::MissingCredential { checked } => assert_eq!(checked, names()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
