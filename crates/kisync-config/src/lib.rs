//! # kisync-config
//!
//! Configuration for kisync.
//!
//! Two kinds of input are handled here:
//!
//! - **Documents**: YAML project documents (known issues to reconcile) and
//!   skiplist documents (input to `convert`). See [`documents`].
//! - **Settings**: how the tool itself runs, layered with figment.
//!
//! Settings sources (in priority order, highest wins):
//! 1. Environment variables (`KISYNC_*` prefix, `__` as separator)
//! 2. Project-level `.kisync.toml`
//! 3. User-level `~/.config/kisync/config.toml`
//! 4. Built-in defaults
//!
//! `KISYNC_HTTP__TIMEOUT_SECS` maps to `http.timeout_secs`,
//! `KISYNC_CREDENTIALS_FILE` to `credentials_file`.

pub mod documents;
mod error;
mod settings;

pub use documents::{
    ProjectDocument, SkiplistDocument, load_projects, load_skiplists, write_project,
};
pub use error::ConfigError;
pub use settings::{HttpSettings, KisyncSettings};

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

const LOCAL_CONFIG: &str = ".kisync.toml";

impl KisyncSettings {
    /// Load settings from all sources (TOML files + environment variables).
    ///
    /// Does NOT read `.env`; use [`load_with_dotenv`](Self::load_with_dotenv)
    /// for that.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be read or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load settings after loading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        if let Err(error) = dotenvy::dotenv()
            && !error.not_found()
        {
            tracing::warn!(%error, "failed to read .env");
        }
        Self::load()
    }

    /// Build the figment provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(LOCAL_CONFIG);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("KISYNC_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("kisync").join("config.toml"))
    }
}
