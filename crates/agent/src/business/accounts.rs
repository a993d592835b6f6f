//! In-memory account source, useful for testing and the CLI.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use botloom_core::business::{AccountSource, BusinessContext};
use botloom_core::error::BusinessError;
use tokio::sync::RwLock;

/// Account snapshots kept in a map.
///
/// Unknown accounts resolve to a fresh starter account unless the source
/// was built with [`InMemoryAccountSource::strict`].
pub struct InMemoryAccountSource {
    accounts: Arc<RwLock<HashMap<String, BusinessContext>>>,
    strict: bool,
}

impl InMemoryAccountSource {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            strict: false,
        }
    }

    /// Unknown accounts fail with [`BusinessError::AccountNotFound`].
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::new()
        }
    }

    /// Insert or replace an account snapshot.
    pub async fn upsert(&self, context: BusinessContext) {
        self.accounts
            .write()
            .await
            .insert(context.account_id.clone(), context);
    }
}

impl Default for InMemoryAccountSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountSource for InMemoryAccountSource {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn fetch(&self, account_id: &str) -> Result<BusinessContext, BusinessError> {
        if let Some(context) = self.accounts.read().await.get(account_id) {
            return Ok(context.clone());
        }
        if self.strict {
            return Err(BusinessError::AccountNotFound(account_id.to_string()));
        }
        Ok(BusinessContext::starter(account_id))
    }
}
