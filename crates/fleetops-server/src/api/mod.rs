mod bookings;
mod crew_tasks;
mod health;
mod params;
mod quotations;
mod shifts;

use axum::Router;

use crate::AppState;

/// Create the API router
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(shifts::router())
        .merge(crew_tasks::router())
        .merge(bookings::router())
        .merge(quotations::router())
}
