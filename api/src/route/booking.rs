use axum::{
    routing::{get, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::booking::{finalize_booking, return_booking, show_booking, show_open_bookings};

pub fn build_booking_routers() -> Router<AppRegistry> {
    let bookings_routers = Router::new()
        .route("/", get(show_open_bookings))
        .route("/:booking_id", get(show_booking))
        .route("/:booking_id/return", put(return_booking))
        .route("/:booking_id/finalize", put(finalize_booking));

    Router::new().nest("/bookings", bookings_routers)
}
