use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::{
    booking::{create_booking, quote_booking, show_product_booking_history},
    product::{delete_product, register_product, show_product, show_product_list, update_product},
};

pub fn build_product_routers() -> Router<AppRegistry> {
    let products_routers = Router::new()
        .route("/", post(register_product))
        .route("/", get(show_product_list))
        .route("/:product_id", get(show_product))
        .route("/:product_id", put(update_product))
        .route("/:product_id", delete(delete_product))
        .route("/:product_id/quote", post(quote_booking))
        .route("/:product_id/bookings", post(create_booking))
        .route("/:product_id/bookings", get(show_product_booking_history));

    Router::new().nest("/products", products_routers)
}
