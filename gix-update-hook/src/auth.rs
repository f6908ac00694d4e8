//! Environment-carried credentials for hook invocations.
//!
//! The transport layer authenticates the pushing user and hands the result
//! to the hook in a single environment variable of the form
//! `<user>:<json>`, where the JSON object carries the access rules computed
//! for this request:
//!
//! ```json
//! {"acl": [["refs/heads/main", "docs/*", 1]], "max_show_violations": 10}
//! ```
//!
//! A token that cannot be parsed is a fatal configuration error; the hook
//! must reject the update rather than guess (fail closed).

use serde::Deserialize;

use crate::acl::AclRule;
use crate::enforce::DEFAULT_MAX_SHOW_VIOLATIONS;
use crate::Error;

/// Name of the environment variable carrying the credential token.
pub const AUTH_ENV: &str = "GIT_UPDATE_AUTH";

/// The authenticated user together with the access rules granted to them
/// for this request.
#[derive(Debug, Clone)]
pub struct Credential {
    /// The authenticated principal; used in messages only.
    pub user: String,
    /// Ordered access rules, as produced by the authenticating layer.
    pub acl: Vec<AclRule>,
    /// Display cap for violation rows (0 = unlimited).
    pub max_show_violations: usize,
}

/// JSON half of the token.
#[derive(Debug, Deserialize)]
struct TokenConfig {
    acl: Vec<AclRule>,
    #[serde(default = "default_max_show")]
    max_show_violations: usize,
}

fn default_max_show() -> usize {
    DEFAULT_MAX_SHOW_VIOLATIONS
}

impl Credential {
    /// Read and parse the token from [`AUTH_ENV`].
    pub fn from_env() -> Result<Self, Error> {
        match std::env::var(AUTH_ENV) {
            Ok(token) => Self::parse(&token),
            Err(std::env::VarError::NotPresent) => {
                Err(Error::credential(format!("{AUTH_ENV} is not set")))
            }
            Err(std::env::VarError::NotUnicode(_)) => {
                Err(Error::credential(format!("{AUTH_ENV} is not valid UTF-8")))
            }
        }
    }

    /// Parse a `<user>:<json>` token.
    pub fn parse(token: &str) -> Result<Self, Error> {
        let (user, config) = token
            .split_once(':')
            .ok_or_else(|| Error::credential("token must have the form <user>:<json>"))?;
        if user.is_empty() {
            return Err(Error::credential("token carries an empty user name"));
        }
        let config: TokenConfig = serde_json::from_str(config)
            .map_err(|err| Error::credential(format!("invalid token configuration: {err}")))?;
        Ok(Credential {
            user: user.to_owned(),
            acl: config.acl,
            max_show_violations: config.max_show_violations,
        })
    }
}
