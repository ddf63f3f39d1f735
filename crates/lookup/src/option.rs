use quickorder_codec::{format_with_label, split_composite};
use serde::{Deserialize, Serialize};

/// One selectable row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupOption {
    pub value: String,
    pub label: String,
}

impl LookupOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// `"value || label"` as stored in the form field.
    pub fn display(&self) -> String {
        format_with_label(&self.value, &self.label)
    }

    pub fn from_display(display: &str) -> Self {
        let parts = split_composite(display);
        Self::new(parts.value(), parts.label())
    }
}

/// Parameters of one page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionQuery {
    pub search_term: String,
    pub offset: usize,
    pub limit: usize,
}

/// A page of options.
///
/// Sources that know whether more rows exist should say so through `has_more`
/// or `total_count`; when both are absent the provider assumes a full page
/// means more may follow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionPage {
    pub options: Vec<LookupOption>,
    pub has_more: Option<bool>,
    pub total_count: Option<u64>,
}

impl OptionPage {
    pub fn new(options: Vec<LookupOption>) -> Self {
        Self {
            options,
            has_more: None,
            total_count: None,
        }
    }

    pub fn with_has_more(mut self, has_more: bool) -> Self {
        self.has_more = Some(has_more);
        self
    }

    pub fn with_total_count(mut self, total_count: u64) -> Self {
        self.total_count = Some(total_count);
        self
    }

    /// Whether another page should be requested after this one.
    pub fn more_available(&self, query: &OptionQuery) -> bool {
        if let Some(has_more) = self.has_more {
            return has_more;
        }
        if let Some(total) = self.total_count {
            return ((query.offset + self.options.len()) as u64) < total;
        }
        query.limit > 0 && self.options.len() == query.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(offset: usize, limit: usize) -> OptionQuery {
        OptionQuery {
            search_term: String::new(),
            offset,
            limit,
        }
    }

    fn rows(n: usize) -> Vec<LookupOption> {
        (0..n).map(|i| LookupOption::new(format!("V{i}"), format!("Row {i}"))).collect()
    }

    #[test]
    fn explicit_signal_wins_over_heuristic() {
        let page = OptionPage::new(rows(2)).with_has_more(true);
        assert!(page.more_available(&query(0, 10)));

        let page = OptionPage::new(rows(10)).with_has_more(false);
        assert!(!page.more_available(&query(0, 10)));
    }

    #[test]
    fn total_count_is_compared_with_offset() {
        let page = OptionPage::new(rows(10)).with_total_count(25);
        assert!(page.more_available(&query(10, 10)));
        let page = OptionPage::new(rows(5)).with_total_count(25);
        assert!(!page.more_available(&query(20, 10)));
    }

    #[test]
    fn display_round_trips_through_codec() {
        let option = LookupOption::new("HBBINS", "Covered wagon");
        assert_eq!(option.display(), "HBBINS || Covered wagon");
        assert_eq!(LookupOption::from_display(&option.display()), option);
    }
}
