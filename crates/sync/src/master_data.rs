//! Lookup options served by the master-data endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use quickorder_lookup::{LookupError, LookupOption, OptionPage, OptionQuery, OptionSource};

use crate::api::{MasterDataRequest, MasterDataRow, QuickOrderApi};

/// One master-data list, e.g. `"Wagon type Init"`.
pub struct MasterDataOptions<A> {
    api: Arc<A>,
    message_type: String,
}

impl<A: QuickOrderApi> MasterDataOptions<A> {
    pub fn new(api: Arc<A>, message_type: impl Into<String>) -> Self {
        Self {
            api,
            message_type: message_type.into(),
        }
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    fn request(&self, query: &OptionQuery) -> MasterDataRequest {
        let term = query.search_term.trim();
        MasterDataRequest {
            message_type: self.message_type.clone(),
            search_term: (!term.is_empty()).then(|| term.to_string()),
            offset: Some(query.offset),
            limit: Some(query.limit),
        }
    }
}

#[async_trait]
impl<A: QuickOrderApi> OptionSource for MasterDataOptions<A> {
    async fn fetch_options(&self, query: OptionQuery) -> Result<OptionPage, LookupError> {
        let envelope = self
            .api
            .get_master_common_data(&self.request(&query))
            .await
            .map_err(|e| LookupError::source(e.to_string()))?;
        if envelope.reported_failure() {
            return Err(LookupError::source(
                envelope
                    .message
                    .unwrap_or_else(|| format!("{} lookup failed", self.message_type)),
            ));
        }
        if envelope.response_data.trim().is_empty() {
            return Ok(OptionPage::new(Vec::new()));
        }
        let rows: Vec<MasterDataRow> = envelope.parse().map_err(|e| LookupError::source(e.to_string()))?;

        // The endpoint reports no totals; a full page means more may follow.
        Ok(OptionPage::new(
            rows.into_iter()
                .map(|row| LookupOption::new(row.id, row.name))
                .collect(),
        ))
    }
}
