use serde::{Deserialize, Serialize};

/// Lifecycle state of an order. Closed set; input that matches none of the
/// values is rejected at the boundary rather than coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_known_values() {
        for value in ["pending", "processing", "completed", "cancelled"] {
            let status = OrderStatus::parse(value).expect("known value");
            assert_eq!(status.as_str(), value);
        }
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(OrderStatus::parse("shipped").is_none());
        assert!(OrderStatus::parse("PENDING").is_none());
        assert!(OrderStatus::parse("").is_none());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, r#""processing""#);
    }
}
