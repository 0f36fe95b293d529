//! # kisync-secrets
//!
//! API token lookup for remote instances.
//!
//! Tokens live in a netrc file: `machine <host> login <user> password <token>`.
//! A `default` entry answers for hosts without their own `machine` line.
//! `account` values are kept, `macdef` bodies are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

const NETRC_FILE_NAME: &str = ".netrc";

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("failed to read credentials file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed credentials file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("no credentials found for {host} in {path}")]
    MissingHost { host: String, path: PathBuf },
    #[error("home directory not found; pass a credentials file explicitly")]
    NoHomeDir,
}

/// Login and token for one remote host.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: Option<String>,
    pub token: String,
    pub account: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("token", &"<redacted>")
            .field("account", &self.account)
            .finish()
    }
}

#[derive(Clone, Default)]
struct Entry {
    /// `None` for the `default` entry.
    machine: Option<String>,
    login: Option<String>,
    password: Option<String>,
    account: Option<String>,
}

/// Parsed netrc file.
#[derive(Clone)]
pub struct CredentialStore {
    path: PathBuf,
    entries: Vec<Entry>,
}

/// `~/.netrc`.
///
/// # Errors
///
/// Returns [`CredentialsError::NoHomeDir`] when the home directory cannot be
/// determined.
pub fn default_path() -> Result<PathBuf, CredentialsError> {
    dirs::home_dir()
        .map(|home| home.join(NETRC_FILE_NAME))
        .ok_or(CredentialsError::NoHomeDir)
}

impl CredentialStore {
    /// Read and parse a netrc file.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::Read`] if the file cannot be read and
    /// [`CredentialsError::Malformed`] if a keyword is missing its value or
    /// an unexpected token appears.
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        let contents = fs::read_to_string(path).map_err(|source| CredentialsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    /// Parse netrc `contents`; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::Malformed`] on syntax errors.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, CredentialsError> {
        let malformed = |reason: String| CredentialsError::Malformed {
            path: path.to_path_buf(),
            reason,
        };

        let mut entries = Vec::new();
        let mut current: Option<Entry> = None;
        let mut tokens = significant_tokens(contents).into_iter();

        while let Some(token) = tokens.next() {
            match token {
                "machine" => {
                    let host = tokens
                        .next()
                        .ok_or_else(|| malformed("'machine' without a host name".into()))?;
                    entries.extend(current.take());
                    current = Some(Entry {
                        machine: Some(host.to_string()),
                        ..Entry::default()
                    });
                }
                "default" => {
                    entries.extend(current.take());
                    current = Some(Entry::default());
                }
                "login" | "password" | "account" => {
                    let value = tokens
                        .next()
                        .ok_or_else(|| malformed(format!("'{token}' without a value")))?;
                    let entry = current
                        .as_mut()
                        .ok_or_else(|| malformed(format!("'{token}' outside of a machine entry")))?;
                    let slot = match token {
                        "login" => &mut entry.login,
                        "password" => &mut entry.password,
                        _ => &mut entry.account,
                    };
                    *slot = Some(value.to_string());
                }
                other => return Err(malformed(format!("unexpected token '{other}'"))),
            }
        }
        entries.extend(current);

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Credentials for `host`, falling back to the `default` entry.
    ///
    /// Entries without a password do not match.
    #[must_use]
    pub fn lookup(&self, host: &str) -> Option<Credentials> {
        let with_password = |entry: &&Entry| entry.password.is_some();
        self.entries
            .iter()
            .filter(with_password)
            .find(|entry| entry.machine.as_deref() == Some(host))
            .or_else(|| {
                self.entries
                    .iter()
                    .filter(with_password)
                    .find(|entry| entry.machine.is_none())
            })
            .and_then(|entry| {
                Some(Credentials {
                    login: entry.login.clone(),
                    token: entry.password.clone()?,
                    account: entry.account.clone(),
                })
            })
    }

    /// Like [`lookup`](Self::lookup) but a miss is an error.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::MissingHost`] when neither a matching
    /// `machine` nor a `default` entry exists.
    pub fn require(&self, host: &str) -> Result<Credentials, CredentialsError> {
        let credentials = self
            .lookup(host)
            .ok_or_else(|| CredentialsError::MissingHost {
                host: host.to_string(),
                path: self.path.clone(),
            })?;
        tracing::info!(
            host,
            login = credentials.login.as_deref().unwrap_or("-"),
            "using credentials"
        );
        Ok(credentials)
    }
}

/// Whitespace-separated tokens with comment lines and `macdef` bodies removed.
///
/// A macro body runs from the line after `macdef` to the next blank line.
fn significant_tokens(contents: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut in_macro = false;

    for line in contents.lines() {
        if in_macro {
            in_macro = !line.trim().is_empty();
            continue;
        }
        if line.trim_start().starts_with('#') {
            continue;
        }
        for token in line.split_whitespace() {
            if token == "macdef" {
                in_macro = true;
                break;
            }
            tokens.push(token);
        }
    }

    tokens
}
