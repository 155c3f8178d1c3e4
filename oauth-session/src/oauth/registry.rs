//! Lookup of configured providers by kind.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::{Provider, ProviderKind};
use crate::error::{configuration_error, ConfigurationErrorKind, Error};

/// Registry of configured providers, one per [`ProviderKind`].
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any provider of the same kind.
    ///
    /// Only configured providers are accepted, so every lookup returns a
    /// provider ready to serve flows.
    pub fn register(&mut self, provider: Arc<dyn Provider>) -> Result<(), Error> {
        let kind = provider.provider();
        if !provider.is_configured() {
            return Err(configuration_error(
                ConfigurationErrorKind::NotConfigured,
                &format!("{} provider must be configured before registration", kind),
            ));
        }

        info!("Registered {} OAuth provider", kind);
        self.providers.insert(kind, provider);
        Ok(())
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn Provider>> {
        self.providers.get(&kind).cloned()
    }

    pub fn kinds(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<ProviderKind> = self.providers.keys().copied().collect();
        kinds.sort_by_key(|kind| kind.as_str());
        kinds
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
