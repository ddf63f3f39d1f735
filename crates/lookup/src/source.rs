use async_trait::async_trait;

use crate::error::LookupError;
use crate::option::{LookupOption, OptionPage, OptionQuery};

/// Caller-supplied page fetcher (typically a remote lookup).
#[async_trait]
pub trait OptionSource: Send + Sync {
    async fn fetch_options(&self, query: OptionQuery) -> Result<OptionPage, LookupError>;
}

/// Preloaded options served through the same paging contract.
///
/// Used for short fixed lists that still want search; the total count is
/// known, so pages carry an exact `total_count`.
#[derive(Debug, Clone, Default)]
pub struct StaticOptions {
    options: Vec<LookupOption>,
}

impl StaticOptions {
    pub fn new(options: Vec<LookupOption>) -> Self {
        Self { options }
    }

    fn matching(&self, term: &str) -> Vec<&LookupOption> {
        let needle = term.trim().to_lowercase();
        self.options
            .iter()
            .filter(|o| {
                needle.is_empty()
                    || o.value.to_lowercase().contains(&needle)
                    || o.label.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

#[async_trait]
impl OptionSource for StaticOptions {
    async fn fetch_options(&self, query: OptionQuery) -> Result<OptionPage, LookupError> {
        let matching = self.matching(&query.search_term);
        let total = matching.len() as u64;
        let options = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect();
        Ok(OptionPage::new(options).with_total_count(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_options_filter_and_page() {
        let source = StaticOptions::new(vec![
            LookupOption::new("KG", "Kilogram"),
            LookupOption::new("TON", "Tonne"),
            LookupOption::new("LB", "Pound"),
        ]);

        let page = source
            .fetch_options(OptionQuery { search_term: "ton".into(), offset: 0, limit: 10 })
            .await
            .unwrap();
        assert_eq!(page.options, vec![LookupOption::new("TON", "Tonne")]);
        assert_eq!(page.total_count, Some(1));

        let page = source
            .fetch_options(OptionQuery { search_term: String::new(), offset: 1, limit: 1 })
            .await
            .unwrap();
        assert_eq!(page.options, vec![LookupOption::new("TON", "Tonne")]);
    }
}
