use serde::{Deserialize, Serialize};

// ============================================================================
// Order Models
// ============================================================================

/// A stored order as returned by list, get and create.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Order {
    pub id: String,
    pub name: String,
    #[serde(rename = "createdUtc")]
    pub created_utc: String,
}

/// Order as returned by update (no creation timestamp).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UpdatedOrder {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderList {
    pub orders: Vec<Order>,
}

/// Client-supplied fields for create and update.
#[derive(Deserialize, Clone, Debug)]
pub struct OrderInput {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_uses_created_utc_field_name() {
        let order = Order {
            id: "abc".to_string(),
            name: "Widget".to_string(),
            created_utc: "2024-01-01T00:00:00.000Z".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&order).unwrap(),
            json!({"id": "abc", "name": "Widget", "createdUtc": "2024-01-01T00:00:00.000Z"})
        );
    }

    #[test]
    fn test_order_input_ignores_extra_fields() {
        let input: OrderInput =
            serde_json::from_value(json!({"name": "Widget", "color": "blue"})).unwrap();
        assert_eq!(input.name, "Widget");
    }

    #[test]
    fn test_order_input_requires_name() {
        let err = serde_json::from_value::<OrderInput>(json!({"title": "Widget"})).unwrap_err();
        assert!(err.to_string().contains("name"));
    }
}
