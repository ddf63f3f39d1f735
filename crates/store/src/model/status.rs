use serde::{Deserialize, Serialize};

/// Lifecycle status of a resource group.
///
/// Statuses the client does not know are kept verbatim so they survive a
/// submit round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceStatus {
    #[default]
    Fresh,
    Initiated,
    UnderExecution,
    Confirmed,
    Completed,
    Cancelled,
    Other(String),
}

impl ResourceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceStatus::Fresh => "Fresh",
            ResourceStatus::Initiated => "Initiated",
            ResourceStatus::UnderExecution => "Under Execution",
            ResourceStatus::Confirmed => "Confirmed",
            ResourceStatus::Completed => "Completed",
            ResourceStatus::Cancelled => "Cancelled",
            ResourceStatus::Other(s) => s,
        }
    }
}

impl From<String> for ResourceStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Fresh" => ResourceStatus::Fresh,
            "Initiated" => ResourceStatus::Initiated,
            "Under Execution" => ResourceStatus::UnderExecution,
            "Confirmed" => ResourceStatus::Confirmed,
            "Completed" => ResourceStatus::Completed,
            "Cancelled" => ResourceStatus::Cancelled,
            _ => ResourceStatus::Other(value),
        }
    }
}

impl From<ResourceStatus> for String {
    fn from(value: ResourceStatus) -> Self {
        match value {
            ResourceStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl core::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the order buys or sells the resources.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    #[default]
    #[serde(alias = "buy", alias = "BUY")]
    Buy,
    #[serde(alias = "sell", alias = "SELL")]
    Sell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_status_survives_round_trip() {
        let status: ResourceStatus = serde_json::from_value(json!("On Hold")).unwrap();
        assert_eq!(status, ResourceStatus::Other("On Hold".into()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("On Hold"));

        let known: ResourceStatus = serde_json::from_value(json!("Under Execution")).unwrap();
        assert_eq!(known, ResourceStatus::UnderExecution);
    }

    #[test]
    fn order_type_accepts_lowercase() {
        let t: OrderType = serde_json::from_value(json!("sell")).unwrap();
        assert_eq!(t, OrderType::Sell);
        assert_eq!(serde_json::to_value(OrderType::Buy).unwrap(), json!("Buy"));
    }
}
