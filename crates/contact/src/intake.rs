use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{ContactStore, StoredContactDocument};

/// Server side of the contact form: turns a received payload into one stored
/// document addressed to the configured recipient.
///
/// The payload is trusted as-is. Nothing is validated here; missing keys are
/// simply absent from the stored copy.
#[derive(Clone)]
pub struct Command {
    store: Arc<dyn ContactStore>,
    recipient: String,
}

impl Command {
    pub fn new(store: Arc<dyn ContactStore>, recipient: impl Into<String>) -> Self {
        Self {
            store,
            recipient: recipient.into(),
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn intake(&self, fields: Map<String, Value>) -> consultoria_shared::Result<String> {
        let document =
            StoredContactDocument::build(fields, &self.recipient).map_err(anyhow::Error::from)?;
        let id = self.store.add(&document).await?;

        tracing::info!(id = %id, "contact document stored");

        Ok(id)
    }
}
