use crate::state::AppState;
use axum::Router;

pub mod datetime;
pub mod dto;
pub mod handlers;
pub mod repo;
pub mod services;
pub mod status;

pub fn router() -> Router<AppState> {
    handlers::order_routes()
}
