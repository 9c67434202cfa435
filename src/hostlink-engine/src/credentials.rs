//! Registration credentials and their usage rules.

use crate::error::EngineError;

/// How the host authenticates against the subscription service.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    UsernamePassword {
        username: String,
        password: String,
        organization: Option<String>,
    },
    ActivationKeys {
        keys: Vec<String>,
        organization: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::UsernamePassword {
                username,
                organization,
                ..
            } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"<redacted>")
                .field("organization", organization)
                .finish(),
            Credentials::ActivationKeys { keys, organization } => f
                .debug_struct("ActivationKeys")
                .field("keys", &keys.len())
                .field("organization", organization)
                .finish(),
        }
    }
}

/// Raw credential parameters as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialArgs {
    pub username: Option<String>,
    pub password: Option<String>,
    pub activation_keys: Vec<String>,
    pub organization: Option<String>,
    pub content_templates: Vec<String>,
}

/// Validated credentials plus content templates to register with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub credentials: Credentials,
    pub content_templates: Vec<String>,
}

impl Credentials {
    /// Validate parameter combinations. `content_enabled` is the resolved
    /// value of the `content` feature.
    pub fn from_args(
        args: &CredentialArgs,
        content_enabled: bool,
    ) -> Result<RegistrationRequest, EngineError> {
        let non_empty = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        let has_keys = !args.activation_keys.is_empty();

        if has_keys && non_empty(&args.username) {
            return Err(EngineError::usage(
                "--username and --activation-key can not be used together",
            ));
        }
        if has_keys && non_empty(&args.password) {
            return Err(EngineError::usage(
                "--password and --activation-key can not be used together",
            ));
        }
        if has_keys && !non_empty(&args.organization) {
            return Err(EngineError::usage(
                "--organization is required, when --activation-key is used",
            ));
        }
        if !args.content_templates.is_empty() && !content_enabled {
            return Err(EngineError::usage(
                "--content-template can not be used when content feature is disabled",
            ));
        }

        let credentials = if has_keys {
            Credentials::ActivationKeys {
                keys: args.activation_keys.clone(),
                organization: args.organization.clone().unwrap_or_default(),
            }
        } else {
            match (&args.username, &args.password) {
                (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                    Credentials::UsernamePassword {
                        username: username.clone(),
                        password: password.clone(),
                        organization: args.organization.clone().filter(|o| !o.is_empty()),
                    }
                }
                _ => {
                    return Err(EngineError::usage(
                        "either --username and --password or --activation-key and --organization are required",
                    ));
                }
            }
        };

        Ok(RegistrationRequest {
            credentials,
            content_templates: args.content_templates.clone(),
        })
    }

    pub fn organization(&self) -> Option<&str> {
        match self {
            Credentials::UsernamePassword { organization, .. } => organization.as_deref(),
            Credentials::ActivationKeys { organization, .. } => Some(organization),
        }
    }
}
