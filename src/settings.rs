//! Settings read from an optional file and the environment.
//!
//! ```toml
//! log_filter = "fiscalis=debug"
//!
//! [[entities]]
//! key = "person"
//! plural = "persons"
//! is_person = true
//!
//! [[entities]]
//! key = "household"
//! plural = "households"
//! roles = [{ key = "parent", subroles = ["first_parent", "second_parent"] }, { key = "child" }]
//! ```
//!
//! Environment variables prefixed with `FISCALIS_` override the file, e.g.
//! `FISCALIS_LOG_FILTER=warn`.

// config lets you read a separate config file
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use config::builder::DefaultState;
use serde::Deserialize;

use crate::entity::{AnyEntity, EntityDescription};
use crate::error::Result;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub log_filter: String,
    #[serde(default)]
    pub entities: Vec<EntityDescription>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: String::from(DEFAULT_LOG_FILTER),
            entities: Vec::new(),
        }
    }
}

impl Settings {
    /// Loads settings from `path` when given (a missing file is skipped),
    /// then from the environment.
    pub fn load(path: Option<&str>) -> Result<Settings> {
        let mut builder = Self::defaults()?;
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(false));
        }
        Self::finish(builder)
    }
    /// Loads settings from in-memory text, then from the environment.
    pub fn from_text(text: &str, format: FileFormat) -> Result<Settings> {
        let builder = Self::defaults()?.add_source(File::from_str(text, format));
        Self::finish(builder)
    }
    pub fn build_entities(&self) -> Result<Vec<AnyEntity>> {
        self.entities.iter().map(EntityDescription::build).collect()
    }
    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder().set_default("log_filter", DEFAULT_LOG_FILTER)?)
    }
    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Settings> {
        let settings = builder
            .add_source(Environment::with_prefix("FISCALIS"))
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }
}
