// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Authentication configuration and the forced identity

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::form_urlencoded;
use url::Url;

use super::session::{quote_literal, Context};
use super::Orchestrator;
use crate::engine::{components, single_value, AuthScript};
use crate::error::{Error, Result};

/// Engine method name for form-based logins
pub const FORM_BASED_AUTH: &str = "formBasedAuthentication";
/// Engine method name for script-based logins
pub const SCRIPT_BASED_AUTH: &str = "scriptBasedAuthentication";

const USERNAME_PLACEHOLDER: &str = "{%username%}";
const PASSWORD_PLACEHOLDER: &str = "{%password%}";
const TOKEN_PLACEHOLDER: &str = "{%user_token%}";

/// Who crawl and scan traffic runs as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanIdentity {
    Anonymous,
    /// Engine user id returned by [`Orchestrator::configure_authentication`]
    User(String),
}

/// Login mechanism
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthStrategy {
    /// Plain form POST
    FormBased,
    /// Scripted login that first fetches a CSRF token
    ScriptBased { csrf_token_field: String },
}

impl AuthStrategy {
    /// Script-based when a non-empty CSRF token field is given
    pub fn from_csrf_field(field: Option<&str>) -> Self {
        match field {
            Some(f) if !f.is_empty() => AuthStrategy::ScriptBased {
                csrf_token_field: f.to_string(),
            },
            _ => AuthStrategy::FormBased,
        }
    }
}

/// Everything needed to log the forced identity in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationSettings {
    pub login_url: String,
    pub username_field: String,
    pub password_field: String,
    pub username: String,
    pub password: String,
    /// Appended verbatim to the login request data
    #[serde(default)]
    pub extra_login_query: String,
    #[serde(default)]
    pub logged_in_indicator: Option<String>,
    #[serde(default)]
    pub logged_out_indicator: Option<String>,
    pub strategy: AuthStrategy,
}

impl AuthenticationSettings {
    /// Form-based login settings
    pub fn form(
        login_url: impl Into<String>,
        username_field: impl Into<String>,
        password_field: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            login_url: login_url.into(),
            username_field: username_field.into(),
            password_field: password_field.into(),
            username: username.into(),
            password: password.into(),
            extra_login_query: String::new(),
            logged_in_indicator: None,
            logged_out_indicator: None,
            strategy: AuthStrategy::FormBased,
        }
    }

    /// Switch to a scripted login guarded by `csrf_token_field`
    pub fn csrf_token_field(mut self, field: impl Into<String>) -> Self {
        self.strategy = AuthStrategy::ScriptBased {
            csrf_token_field: field.into(),
        };
        self
    }

    pub fn extra_login_query(mut self, extra: impl Into<String>) -> Self {
        self.extra_login_query = extra.into();
        self
    }

    pub fn logged_in_indicator(mut self, indicator: impl Into<String>) -> Self {
        self.logged_in_indicator = Some(indicator.into());
        self
    }

    pub fn logged_out_indicator(mut self, indicator: impl Into<String>) -> Self {
        self.logged_out_indicator = Some(indicator.into());
        self
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Authentication method configuration as the engine expects it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginTemplate {
    pub method: &'static str,
    /// Login body with engine placeholders, before encoding
    pub request_data: String,
    /// URL-encoded method configuration
    pub config_params: String,
}

impl LoginTemplate {
    pub fn build(settings: &AuthenticationSettings, script: &AuthScript) -> Result<Self> {
        Url::parse(&settings.login_url).map_err(|e| {
            Error::encoding(format!("login URL {:?} is not absolute: {}", settings.login_url, e))
        })?;
        if settings.username_field.is_empty() || settings.password_field.is_empty() {
            return Err(Error::encoding("username and password field names must not be empty"));
        }

        let credentials = format!(
            "{}={}&{}={}",
            settings.username_field, USERNAME_PLACEHOLDER, settings.password_field, PASSWORD_PLACEHOLDER
        );

        match settings.strategy {
            AuthStrategy::FormBased => {
                let request_data = format!("{}{}", credentials, settings.extra_login_query);
                let config_params = format!(
                    "loginUrl={}&loginRequestData={}",
                    encode(&settings.login_url),
                    encode(&request_data)
                );
                Ok(Self {
                    method: FORM_BASED_AUTH,
                    request_data,
                    config_params,
                })
            }
            AuthStrategy::ScriptBased { ref csrf_token_field } => {
                if csrf_token_field.is_empty() {
                    return Err(Error::encoding("CSRF token field name must not be empty"));
                }
                let request_data =
                    format!("{}&{}={}", credentials, csrf_token_field, TOKEN_PLACEHOLDER);
                let config_params = format!(
                    "scriptName={}&LoginURL={}&CSRFField={}&POSTData={}{}",
                    script.name,
                    settings.login_url,
                    csrf_token_field,
                    encode(&request_data),
                    settings.extra_login_query
                );
                Ok(Self {
                    method: SCRIPT_BASED_AUTH,
                    request_data,
                    config_params,
                })
            }
        }
    }
}

impl Orchestrator {
    /// Configure login for `context`, create the synthetic identity and
    /// force all further traffic in the context to run as it.
    ///
    /// Returns the engine user id.
    pub async fn configure_authentication(
        &self,
        context: &Context,
        settings: &AuthenticationSettings,
    ) -> Result<String> {
        info!(
            user = %settings.username,
            login_url = %settings.login_url,
            "Configuring authentication"
        );

        let script = &self.config.auth_script;
        let template = LoginTemplate::build(settings, script)?;

        if let AuthStrategy::ScriptBased { ref csrf_token_field } = settings.strategy {
            self.engine
                .action(components::ACSRF, "addOptionToken", &[("String", csrf_token_field.as_str())])
                .await?;
            self.load_auth_script(script).await?;
        }

        self.engine
            .action(
                components::AUTHENTICATION,
                "setAuthenticationMethod",
                &[
                    ("contextId", context.id.as_str()),
                    ("authMethodName", template.method),
                    ("authMethodConfigParams", template.config_params.as_str()),
                ],
            )
            .await?;

        if let Some(indicator) = settings.logged_in_indicator.as_deref().filter(|i| !i.is_empty()) {
            self.engine
                .action(
                    components::AUTHENTICATION,
                    "setLoggedInIndicator",
                    &[
                        ("contextId", context.id.as_str()),
                        ("loggedInIndicatorRegex", quote_literal(indicator).as_str()),
                    ],
                )
                .await?;
        }
        if let Some(indicator) = settings.logged_out_indicator.as_deref().filter(|i| !i.is_empty()) {
            self.engine
                .action(
                    components::AUTHENTICATION,
                    "setLoggedOutIndicator",
                    &[
                        ("contextId", context.id.as_str()),
                        ("loggedOutIndicatorRegex", quote_literal(indicator).as_str()),
                    ],
                )
                .await?;
        }

        let doc = self
            .engine
            .action(
                components::USERS,
                "newUser",
                &[("contextId", context.id.as_str()), ("name", self.config.forced_user.as_str())],
            )
            .await?;
        let user_id = single_value(&doc);
        if user_id.is_empty() {
            return Err(Error::unexpected("users/action/newUser", "no user id returned"));
        }

        let credentials = format!("username={}&password={}", settings.username, settings.password);
        self.engine
            .action(
                components::USERS,
                "setAuthenticationCredentials",
                &[
                    ("contextId", context.id.as_str()),
                    ("userId", user_id.as_str()),
                    ("authCredentialsConfigParams", credentials.as_str()),
                ],
            )
            .await?;
        self.engine
            .action(
                components::USERS,
                "setUserEnabled",
                &[
                    ("contextId", context.id.as_str()),
                    ("userId", user_id.as_str()),
                    ("enabled", "true"),
                ],
            )
            .await?;

        self.engine
            .action(
                components::FORCED_USER,
                "setForcedUser",
                &[("contextId", context.id.as_str()), ("userId", user_id.as_str())],
            )
            .await?;
        self.engine
            .action(components::FORCED_USER, "setForcedUserModeEnabled", &[("boolean", "true")])
            .await?;

        debug!(user_id = %user_id, context = %context.name, "Forced identity enabled");
        Ok(user_id)
    }

    async fn load_auth_script(&self, script: &AuthScript) -> Result<()> {
        let result = self
            .engine
            .action(
                components::SCRIPT,
                "load",
                &[
                    ("scriptName", script.name.as_str()),
                    ("scriptType", script.script_type.as_str()),
                    ("scriptEngine", script.script_engine.as_str()),
                    ("fileName", script.file_name.as_str()),
                    ("scriptDescription", script.description.as_str()),
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.engine_code() == Some("already_exists") => {
                debug!(script = %script.name, "Login script already loaded");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
