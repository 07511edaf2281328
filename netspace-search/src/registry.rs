//! Name-to-adapter lookup.

use crate::config::SearchConfig;
use crate::engines::Adapter;
use crate::error::SearchError;
use crate::http;
use crate::types::Source;

/// Holds one adapter per known source, all sharing a single HTTP client.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    fofa: Adapter,
    hunter: Adapter,
    quake: Adapter,
}

impl SourceRegistry {
    /// Build every adapter from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Configuration`] if `config` fails validation,
    /// or [`SearchError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let client = http::build_client(config)?;
        Ok(Self {
            fofa: Adapter::new(Source::Fofa, config, client.clone()),
            hunter: Adapter::new(Source::Hunter, config, client.clone()),
            quake: Adapter::new(Source::Quake, config, client),
        })
    }

    /// Look up an adapter by name, case-insensitively.
    ///
    /// Unknown names return `None`; callers are expected to warn and skip.
    pub fn resolve(&self, name: &str) -> Option<&Adapter> {
        name.parse::<Source>().ok().map(|s| self.adapter(s))
    }

    /// The adapter for an already-resolved source.
    pub fn adapter(&self, source: Source) -> &Adapter {
        source.pick(&self.fofa, &self.hunter, &self.quake)
    }

    /// All adapters in canonical order.
    pub fn adapters(&self) -> impl Iterator<Item = &Adapter> {
        Source::all().iter().map(|&s| self.adapter(s))
    }
}
