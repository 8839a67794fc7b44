use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use super::datetime;
use super::repo::{OrderLineRow, OrderRow, TaskRow};

/// One order line in a create/update payload. Requiredness is validated in
/// the service so missing fields produce a named error instead of a serde
/// rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLinePayload {
    pub amount: Option<f64>,
    pub product_name: Option<String>,
    pub picked_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub name: Option<String>,
    pub order_number: Option<i64>,
    pub order_date: Option<String>,
    pub status: Option<String>,
    pub currency: Option<String>,
    pub order_lines: Option<Vec<OrderLinePayload>>,
}

/// Partial update. A `null` counts as absent for every field here,
/// including `orderLines`: only a present, non-null array triggers the
/// replace-all of existing lines.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub name: Option<String>,
    pub order_number: Option<i64>,
    pub order_date: Option<String>,
    pub status: Option<String>,
    pub order_lines: Option<Vec<OrderLinePayload>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LinkTasksRequest {
    pub tasks: Option<Vec<TaskPayload>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub execution_date: Option<String>,
}

/// Partial task update. `name` treats null as absent; `description` and
/// `executionDate` distinguish a present null (clears the field) from an
/// absent key (leaves it unchanged).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub execution_date: Option<Option<String>>,
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineResponse {
    pub id: i64,
    pub amount: f64,
    pub product_name: String,
    #[serde(serialize_with = "datetime::serialize_option")]
    pub picked_date: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(serialize_with = "datetime::serialize_option")]
    pub execution_date: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub name: String,
    pub order_number: i64,
    #[serde(serialize_with = "datetime::serialize")]
    pub order_date: OffsetDateTime,
    pub status: String,
    pub currency: String,
    pub order_lines: Vec<OrderLineResponse>,
    pub tasks: Vec<TaskResponse>,
}

impl OrderResponse {
    pub fn from_rows(order: OrderRow, lines: Vec<OrderLineRow>, tasks: Vec<TaskRow>) -> Self {
        Self {
            id: order.id,
            name: order.name,
            order_number: order.order_number,
            order_date: order.order_date,
            status: order.status,
            currency: order.currency,
            order_lines: lines
                .into_iter()
                .map(|l| OrderLineResponse {
                    id: l.id,
                    amount: l.amount,
                    product_name: l.product_name,
                    picked_date: l.picked_date,
                })
                .collect(),
            tasks: tasks
                .into_iter()
                .map(|t| TaskResponse {
                    id: t.id,
                    name: t.name,
                    description: t.description,
                    execution_date: t.execution_date,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_fields_are_optional() {
        let req: CreateOrderRequest =
            serde_json::from_value(json!({ "orderDate": "2025-06-01 10:00:00" })).unwrap();
        assert!(req.name.is_none());
        assert!(req.order_number.is_none());
        assert!(req.status.is_none());
        assert!(req.currency.is_none());
        assert!(req.order_lines.is_none());
    }

    #[test]
    fn update_request_distinguishes_absent_null_and_empty_lines() {
        let absent: UpdateOrderRequest = serde_json::from_value(json!({ "name": "x" })).unwrap();
        assert!(absent.order_lines.is_none());

        let null: UpdateOrderRequest =
            serde_json::from_value(json!({ "orderLines": null })).unwrap();
        assert!(null.order_lines.is_none());

        let empty: UpdateOrderRequest = serde_json::from_value(json!({ "orderLines": [] })).unwrap();
        assert_eq!(empty.order_lines.map(|v| v.len()), Some(0));
    }

    #[test]
    fn task_patch_distinguishes_absent_null_and_value() {
        let absent: UpdateTaskRequest = serde_json::from_value(json!({ "name": "t" })).unwrap();
        assert!(absent.description.is_none());
        assert!(absent.execution_date.is_none());

        let cleared: UpdateTaskRequest =
            serde_json::from_value(json!({ "description": null, "executionDate": null })).unwrap();
        assert_eq!(cleared.description, Some(None));
        assert_eq!(cleared.execution_date, Some(None));

        let set: UpdateTaskRequest =
            serde_json::from_value(json!({ "description": "notes" })).unwrap();
        assert_eq!(set.description, Some(Some("notes".to_string())));
    }

    #[test]
    fn order_response_serializes_wire_shape() {
        let resp = OrderResponse {
            id: 7,
            name: "Test Order".into(),
            order_number: 1001,
            order_date: crate::orders::datetime::parse_timestamp("2025-06-01 10:00:00").unwrap(),
            status: "pending".into(),
            currency: "EUR".into(),
            order_lines: vec![OrderLineResponse {
                id: 1,
                amount: 2.0,
                product_name: "Widget A".into(),
                picked_date: None,
            }],
            tasks: vec![],
        };

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            json!({
                "id": 7,
                "name": "Test Order",
                "orderNumber": 1001,
                "orderDate": "2025-06-01 10:00:00",
                "status": "pending",
                "currency": "EUR",
                "orderLines": [
                    { "id": 1, "amount": 2.0, "productName": "Widget A", "pickedDate": null }
                ],
                "tasks": []
            })
        );
    }
}
