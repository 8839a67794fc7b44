use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiResult, AppJson, AppPath},
    state::AppState,
};

use super::dto::{
    CreateOrderRequest, LinkTasksRequest, OrderResponse, UpdateOrderRequest, UpdateStatusRequest,
    UpdateTaskRequest,
};
use super::repo::OrderRow;
use super::services;

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route(
            "/orders/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/orders/:id/status", patch(update_order_status))
        .route("/orders/:id/tasks", post(link_tasks))
        .route(
            "/orders/:id/tasks/:task_id",
            put(update_task).delete(delete_task),
        )
}

/// Owner-scoped resolution used by every order-scoped endpoint. A missing
/// order and a foreign-owned order produce the same 404.
async fn find_owned(state: &AppState, id: i64, user_id: Uuid) -> ApiResult<OrderRow> {
    OrderRow::find_owned(&state.db, id, user_id)
        .await?
        .ok_or(ApiError::NotFound("Order not found"))
}

#[instrument(skip(state, payload))]
pub async fn create_order(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<OrderResponse>)> {
    let order = services::create_order(&state.db, user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<OrderResponse>>> {
    let rows = OrderRow::list_by_user(&state.db, user_id).await?;
    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        orders.push(services::load_order(&state.db, row).await?);
    }
    Ok(Json(orders))
}

#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<Json<OrderResponse>> {
    let order = find_owned(&state, id, user_id).await?;
    Ok(Json(services::load_order(&state.db, order).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_order(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateOrderRequest>,
) -> ApiResult<Json<OrderResponse>> {
    let order = find_owned(&state, id, user_id).await?;
    Ok(Json(services::update_order(&state.db, order, payload).await?))
}

#[instrument(skip(state))]
pub async fn delete_order(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<Json<Value>> {
    let order = find_owned(&state, id, user_id).await?;
    services::delete_order(&state.db, &order).await?;
    Ok(Json(json!({ "status": "Order deleted" })))
}

#[instrument(skip(state, payload))]
pub async fn update_order_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> ApiResult<Json<OrderResponse>> {
    let order = find_owned(&state, id, user_id).await?;
    let status = match payload.status.as_deref() {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => return Err(ApiError::validation("Status required")),
    };
    Ok(Json(
        services::update_order_status(&state.db, order, &status).await?,
    ))
}

#[instrument(skip(state, payload))]
pub async fn link_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<LinkTasksRequest>,
) -> ApiResult<Json<OrderResponse>> {
    let order = find_owned(&state, id, user_id).await?;
    let tasks = match payload.tasks {
        Some(tasks) if !tasks.is_empty() => tasks,
        _ => return Err(ApiError::validation("Tasks array required")),
    };
    Ok(Json(services::link_tasks(&state.db, order, tasks).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath((id, task_id)): AppPath<(i64, i64)>,
    AppJson(payload): AppJson<UpdateTaskRequest>,
) -> ApiResult<Json<OrderResponse>> {
    let order = find_owned(&state, id, user_id).await?;
    Ok(Json(
        services::update_task(&state.db, order, task_id, payload).await?,
    ))
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath((id, task_id)): AppPath<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    let order = find_owned(&state, id, user_id).await?;
    services::delete_task(&state.db, &order, task_id).await?;
    Ok(Json(json!({ "status": "Task deleted" })))
}
