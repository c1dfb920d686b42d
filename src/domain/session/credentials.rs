//! Login input and session artifacts.
//!
//! `LoginCredentials` is what the operator hands the bot; `SessionCredentials`
//! is what the platform hands back. Cookies and session id travel together in
//! `SessionCredentials` so one can never be stored without the other.

use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeSet;
use std::fmt;

use super::AuthError;
use crate::domain::foundation::{SessionId, ValidationError};

/// Material that lets the authenticator answer a two-factor challenge, or
/// skip the password entirely when resuming a remembered login.
#[derive(Clone, Default)]
pub struct TwoFactorMaterial {
    pub guard_code: Option<String>,
    pub oauth_token: Option<SecretString>,
}

impl TwoFactorMaterial {
    fn can_resume_without_password(&self) -> bool {
        let has_code = self
            .guard_code
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        let has_token = self
            .oauth_token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().trim().is_empty());
        has_code && has_token
    }
}

impl fmt::Debug for TwoFactorMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwoFactorMaterial")
            .field("guard_code", &self.guard_code.as_ref().map(|_| "[REDACTED]"))
            .field("oauth_token", &self.oauth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Credentials for logging a bot account in.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    account_name: String,
    password: Option<SecretString>,
    two_factor: TwoFactorMaterial,
    display_name: Option<String>,
}

impl LoginCredentials {
    /// Validates and builds login credentials.
    ///
    /// Without a password, both a guard code and an oauth token are required.
    ///
    /// # Errors
    ///
    /// `AuthError::MissingCredentials` if the account name is blank or the
    /// password is absent without resumable two-factor material.
    pub fn new(
        account_name: impl Into<String>,
        password: Option<SecretString>,
        two_factor: TwoFactorMaterial,
    ) -> Result<Self, AuthError> {
        let account_name = account_name.into();
        if account_name.trim().is_empty() {
            return Err(AuthError::MissingCredentials("account name".to_string()));
        }

        let has_password = password
            .as_ref()
            .is_some_and(|p| !p.expose_secret().is_empty());
        if !has_password && !two_factor.can_resume_without_password() {
            return Err(AuthError::MissingCredentials(
                "password, or guard code together with oauth token".to_string(),
            ));
        }

        Ok(Self {
            account_name,
            password,
            two_factor,
            display_name: None,
        })
    }

    /// Sets the display name the account should carry.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Supplies a guard code after an out-of-band challenge.
    pub fn with_guard_code(mut self, code: impl Into<String>) -> Self {
        self.two_factor.guard_code = Some(code.into());
        self
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    pub fn two_factor(&self) -> &TwoFactorMaterial {
        &self.two_factor
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

/// Opaque set of `name=value` cookie pairs issued by the platform.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookies(BTreeSet<String>);

impl SessionCookies {
    /// Builds a cookie set, rejecting empty sets and pairs without `=`.
    pub fn new<I, S>(cookies: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for cookie in cookies {
            let cookie = cookie.into();
            match cookie.split_once('=') {
                Some((name, _)) if !name.trim().is_empty() => {
                    set.insert(cookie.trim().to_string());
                }
                _ => {
                    return Err(ValidationError::invalid_format(
                        "cookies",
                        "cookie must be a name=value pair",
                    ))
                }
            }
        }
        if set.is_empty() {
            return Err(ValidationError::empty_field("cookies"));
        }
        Ok(Self(set))
    }

    /// Value for an HTTP `Cookie` header.
    pub fn header_value(&self) -> String {
        self.0.iter().map(String::as_str).collect::<Vec<_>>().join("; ")
    }

    /// Cookie names without values, safe to log.
    pub fn names(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter_map(|c| c.split_once('=').map(|(name, _)| name))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Debug for SessionCookies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionCookies").field(&self.names()).finish()
    }
}

/// Cookies and session id of an established session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    cookies: SessionCookies,
    session_id: SessionId,
}

impl SessionCredentials {
    pub fn new(cookies: SessionCookies, session_id: SessionId) -> Self {
        Self {
            cookies,
            session_id,
        }
    }

    pub fn cookies(&self) -> &SessionCookies {
        &self.cookies
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}
