//! API credential resolution.
//!
//! The key is looked up in `GOOGLE_API_KEY` (after loading a `.env` file if
//! one exists). When the variable is missing or blank the operator is asked
//! for it on the terminal without echo. The resolved key is returned as a
//! [`Credential`] value and handed to the inference client explicitly; the
//! process environment is never modified.

use std::{
    env,
    fmt::{Debug, Formatter, Result as FmtResult},
    io::Result as IoResult,
};

use crate::error::ConfigurationError;

/// Environment variable holding the inference-service key.
pub const API_KEY_VARIABLE: &str = "GOOGLE_API_KEY";

const PROMPT_TEXT: &str = "Enter your Gemini API Key: ";

/// The secret that authorizes calls to the inference service.
///
/// `Debug` output is redacted so the key never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a key. No format validation is performed.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw key, for building the request's authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("Credential(***)")
    }
}

impl From<&str> for Credential {
    fn from(secret: &str) -> Self {
        Credential::new(secret)
    }
}

/// Source of an interactively entered secret.
pub trait SecretPrompt {
    /// Show `prompt` and read one line without echoing it.
    fn read_secret(&self, prompt: &str) -> IoResult<String>;
}

/// Reads the secret from the controlling terminal with echo disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl SecretPrompt for TerminalPrompt {
    fn read_secret(&self, prompt: &str) -> IoResult<String> {
        rpassword::prompt_password(prompt)
    }
}

impl<F> SecretPrompt for F
where
    F: Fn(&str) -> IoResult<String>,
{
    fn read_secret(&self, prompt: &str) -> IoResult<String> {
        self(prompt)
    }
}

/// Resolve the credential from `.env`, the environment, or the terminal.
///
/// # Errors
///
/// - [`ConfigurationError::Prompt`] if the terminal cannot be read.
/// - [`ConfigurationError::Empty`] if the operator enters nothing.
pub fn resolve_credential() -> Result<Credential, ConfigurationError> {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(error) if error.not_found() => log::debug!("No .env file found"),
        Err(error) => log::warn!("Ignoring unreadable .env file: {error}"),
    }

    resolve_credential_with(|name| env::var(name).ok(), &TerminalPrompt)
}

/// Resolve the credential using an explicit environment lookup and prompt.
///
/// `lookup` is called with [`API_KEY_VARIABLE`]; a missing or whitespace-only
/// value falls through to `prompt`. Surrounding whitespace is trimmed from
/// whichever source supplies the key.
///
/// # Errors
///
/// Same as [`resolve_credential`].
pub fn resolve_credential_with<L, P>(lookup: L, prompt: &P) -> Result<Credential, ConfigurationError>
where
    L: Fn(&str) -> Option<String>,
    P: SecretPrompt + ?Sized,
{
    if let Some(value) = lookup(API_KEY_VARIABLE) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            log::debug!("Using API key from {API_KEY_VARIABLE}");
            return Ok(Credential::new(trimmed));
        }
    }

    log::debug!("{API_KEY_VARIABLE} is not set; prompting for API key");
    let entered = prompt.read_secret(PROMPT_TEXT)?;
    let trimmed = entered.trim();
    if trimmed.is_empty() {
        return Err(ConfigurationError::Empty {
            variable: API_KEY_VARIABLE.to_string(),
        });
    }

    Ok(Credential::new(trimmed))
}
