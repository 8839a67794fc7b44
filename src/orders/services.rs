use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

use super::datetime::parse_timestamp;
use super::dto::{
    CreateOrderRequest, OrderLinePayload, OrderResponse, TaskPayload, UpdateOrderRequest,
    UpdateTaskRequest,
};
use super::repo::{OrderLineRow, OrderRow, TaskRow};
use super::status::OrderStatus;

/// Validated order line ready for insertion.
struct NewLine {
    amount: f64,
    product_name: String,
    picked_date: Option<OffsetDateTime>,
}

/// Validated task ready for insertion.
struct NewTask {
    name: String,
    description: Option<String>,
    execution_date: OffsetDateTime,
}

fn parse_status(value: &str) -> ApiResult<OrderStatus> {
    OrderStatus::parse(value)
        .ok_or_else(|| ApiError::validation(format!("Invalid order status '{value}'")))
}

fn parse_required_date(value: Option<&str>, field: &str) -> ApiResult<OffsetDateTime> {
    let raw = value.ok_or_else(|| ApiError::validation(format!("{field} is required")))?;
    parse_timestamp(raw).ok_or_else(|| ApiError::validation(format!("Invalid {field} '{raw}'")))
}

fn parse_optional_date(value: Option<&str>, field: &str) -> ApiResult<Option<OffsetDateTime>> {
    match value {
        None => Ok(None),
        Some(raw) => parse_timestamp(raw)
            .map(Some)
            .ok_or_else(|| ApiError::validation(format!("Invalid {field} '{raw}'"))),
    }
}

fn validate_line(payload: OrderLinePayload) -> ApiResult<NewLine> {
    let amount = payload
        .amount
        .ok_or_else(|| ApiError::validation("Order line amount is required"))?;
    let product_name = payload
        .product_name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("Order line productName is required"))?;
    let picked_date = parse_optional_date(payload.picked_date.as_deref(), "pickedDate")?;
    Ok(NewLine {
        amount,
        product_name,
        picked_date,
    })
}

fn validate_task(payload: TaskPayload) -> ApiResult<NewTask> {
    let name = payload
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("Task name is required"))?;
    let execution_date = parse_required_date(payload.execution_date.as_deref(), "executionDate")?;
    Ok(NewTask {
        name,
        description: payload.description,
        execution_date,
    })
}

/// Assembles the full aggregate for a loaded order row, children ordered
/// by id ascending.
pub async fn load_order(db: &PgPool, order: OrderRow) -> ApiResult<OrderResponse> {
    let lines = OrderLineRow::list_by_order(db, order.id).await?;
    let tasks = TaskRow::list_by_order(db, order.id).await?;
    Ok(OrderResponse::from_rows(order, lines, tasks))
}

/// Creates the order and all supplied lines in one transaction. Defaults:
/// empty name, order number 0, pending status, empty currency.
pub async fn create_order(
    db: &PgPool,
    user_id: Uuid,
    payload: CreateOrderRequest,
) -> ApiResult<OrderResponse> {
    let order_date = parse_required_date(payload.order_date.as_deref(), "orderDate")?;
    let status = match payload.status.as_deref() {
        Some(value) => parse_status(value)?,
        None => OrderStatus::default(),
    };
    let lines = payload
        .order_lines
        .unwrap_or_default()
        .into_iter()
        .map(validate_line)
        .collect::<ApiResult<Vec<_>>>()?;

    let name = payload.name.unwrap_or_default();
    let order_number = payload.order_number.unwrap_or(0);
    let currency = payload.currency.unwrap_or_default();

    let mut tx = db.begin().await?;
    let order = OrderRow::insert(
        &mut tx,
        user_id,
        &name,
        order_number,
        order_date,
        status.as_str(),
        &currency,
    )
    .await?;
    let mut line_rows = Vec::with_capacity(lines.len());
    for line in lines {
        line_rows.push(
            OrderLineRow::insert(&mut tx, order.id, line.amount, &line.product_name, line.picked_date)
                .await?,
        );
    }
    tx.commit().await?;

    info!(order_id = order.id, user_id = %user_id, "order created");
    Ok(OrderResponse::from_rows(order, line_rows, Vec::new()))
}

/// Partial update. When the payload carries an `orderLines` array (even an
/// empty one) every existing line is deleted and replaced inside the same
/// transaction as the field update; otherwise lines are untouched.
pub async fn update_order(
    db: &PgPool,
    mut order: OrderRow,
    payload: UpdateOrderRequest,
) -> ApiResult<OrderResponse> {
    if let Some(name) = payload.name {
        order.name = name;
    }
    if let Some(number) = payload.order_number {
        order.order_number = number;
    }
    if let Some(raw) = payload.order_date.as_deref() {
        order.order_date = parse_timestamp(raw)
            .ok_or_else(|| ApiError::validation(format!("Invalid orderDate '{raw}'")))?;
    }
    if let Some(raw) = payload.status.as_deref() {
        order.status = parse_status(raw)?.as_str().to_string();
    }

    let replacement = match payload.order_lines {
        Some(lines) => Some(
            lines
                .into_iter()
                .map(validate_line)
                .collect::<ApiResult<Vec<_>>>()?,
        ),
        None => None,
    };

    let mut tx = db.begin().await?;
    order.save(&mut tx).await?;
    if let Some(lines) = replacement {
        OrderLineRow::delete_by_order(&mut tx, order.id).await?;
        for line in lines {
            OrderLineRow::insert(&mut tx, order.id, line.amount, &line.product_name, line.picked_date)
                .await?;
        }
    }
    tx.commit().await?;

    info!(order_id = order.id, "order updated");
    load_order(db, order).await
}

pub async fn delete_order(db: &PgPool, order: &OrderRow) -> ApiResult<()> {
    OrderRow::delete(db, order.id).await?;
    info!(order_id = order.id, "order deleted");
    Ok(())
}

/// Sets status only; unrecognized values are rejected before anything is
/// written.
pub async fn update_order_status(
    db: &PgPool,
    mut order: OrderRow,
    status: &str,
) -> ApiResult<OrderResponse> {
    order.status = parse_status(status)?.as_str().to_string();

    let mut tx = db.begin().await?;
    order.save(&mut tx).await?;
    tx.commit().await?;

    info!(order_id = order.id, status = %order.status, "order status updated");
    load_order(db, order).await
}

/// Appends tasks to the order; existing tasks are never touched. All
/// payloads are validated before the first insert so a bad entry leaves
/// nothing behind.
pub async fn link_tasks(
    db: &PgPool,
    order: OrderRow,
    payloads: Vec<TaskPayload>,
) -> ApiResult<OrderResponse> {
    let tasks = payloads
        .into_iter()
        .map(validate_task)
        .collect::<ApiResult<Vec<_>>>()?;

    let mut tx = db.begin().await?;
    for task in &tasks {
        TaskRow::insert(
            &mut tx,
            order.id,
            &task.name,
            task.description.as_deref(),
            Some(task.execution_date),
        )
        .await?;
    }
    tx.commit().await?;

    info!(order_id = order.id, count = tasks.len(), "tasks linked");
    load_order(db, order).await
}

/// Patches one task within the order. `description` and `executionDate`
/// follow key-present semantics: an explicit null clears the field.
pub async fn update_task(
    db: &PgPool,
    order: OrderRow,
    task_id: i64,
    payload: UpdateTaskRequest,
) -> ApiResult<OrderResponse> {
    let mut task = TaskRow::find_in_order(db, order.id, task_id)
        .await?
        .ok_or(ApiError::NotFound("Task not found for this order"))?;

    if let Some(name) = payload.name {
        task.name = name;
    }
    if let Some(description) = payload.description {
        task.description = description;
    }
    if let Some(raw) = payload.execution_date {
        task.execution_date = parse_optional_date(raw.as_deref(), "executionDate")?;
    }

    task.save(db).await?;

    info!(order_id = order.id, task_id, "task updated");
    load_order(db, order).await
}

pub async fn delete_task(db: &PgPool, order: &OrderRow, task_id: i64) -> ApiResult<()> {
    if !TaskRow::delete_in_order(db, order.id, task_id).await? {
        return Err(ApiError::NotFound("Task not found for this order"));
    }
    info!(order_id = order.id, task_id, "task deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_requires_amount_and_product_name() {
        let missing_amount = OrderLinePayload {
            amount: None,
            product_name: Some("Widget A".into()),
            picked_date: None,
        };
        assert!(validate_line(missing_amount).is_err());

        let empty_name = OrderLinePayload {
            amount: Some(2.0),
            product_name: Some(String::new()),
            picked_date: None,
        };
        assert!(validate_line(empty_name).is_err());

        let ok = OrderLinePayload {
            amount: Some(2.0),
            product_name: Some("Widget A".into()),
            picked_date: Some("2025-06-01 10:00:00".into()),
        };
        let line = validate_line(ok).expect("valid line");
        assert_eq!(line.amount, 2.0);
        assert!(line.picked_date.is_some());
    }

    #[test]
    fn line_rejects_malformed_picked_date() {
        let payload = OrderLinePayload {
            amount: Some(1.0),
            product_name: Some("Widget B".into()),
            picked_date: Some("yesterday".into()),
        };
        assert!(validate_line(payload).is_err());
    }

    #[test]
    fn task_requires_name_and_execution_date() {
        let missing_date = TaskPayload {
            name: Some("First Task".into()),
            description: None,
            execution_date: None,
        };
        assert!(validate_task(missing_date).is_err());

        let ok = TaskPayload {
            name: Some("First Task".into()),
            description: Some("Do something".into()),
            execution_date: Some("2025-06-03T09:00:00+00:00".into()),
        };
        let task = validate_task(ok).expect("valid task");
        assert_eq!(task.name, "First Task");
        assert_eq!(task.description.as_deref(), Some("Do something"));
    }

    #[test]
    fn status_parse_is_strict() {
        assert!(parse_status("pending").is_ok());
        let err = parse_status("shipped").unwrap_err();
        assert!(err.to_string().contains("shipped"));
    }
}
