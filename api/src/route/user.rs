use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::user::{
    change_role, delete_user, get_current_user, get_my_bookings, list_users, register_user,
    update_current_user,
};

pub fn build_user_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/", post(register_user))
        .route("/", get(list_users))
        .route("/me", get(get_current_user))
        .route("/me", put(update_current_user))
        .route("/me/bookings", get(get_my_bookings))
        .route("/:user_id/role", put(change_role))
        .route("/:user_id", delete(delete_user));

    Router::new().nest("/users", routers)
}
