use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use kernel::model::{id::UserId, role::Role, user::User};
use kernel::pricing::PricingPolicy;
use kernel::repository::{
    booking::MockBookingRepository, health::MockHealthCheckRepository,
    product::MockProductRepository, user::MockUserRepository,
};
use registry::AppRegistry;
use tower::ServiceExt;

use crate::{extractor::USER_ID_HEADER, route::v1::routes};

#[derive(Default)]
pub struct Mocks {
    pub health: MockHealthCheckRepository,
    pub product: MockProductRepository,
    pub user: MockUserRepository,
    pub booking: MockBookingRepository,
}

impl Mocks {
    // 認証済みユーザーとして解決されるユーザーを登録する
    pub fn with_user(mut self, user: &User) -> Self {
        let user = user.clone();
        let user_id = user.user_id;
        self.user
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .returning(move |_| Ok(Some(user.clone())));
        self
    }

    pub fn into_app(self) -> Router {
        let registry = AppRegistry::with_repositories(
            Arc::new(self.health),
            Arc::new(self.product),
            Arc::new(self.user),
            Arc::new(self.booking),
            PricingPolicy::default(),
        );
        routes().with_state(registry)
    }
}

pub fn user_with_role(role: Role) -> User {
    User {
        user_id: UserId::new(),
        user_name: format!("{} user", role.as_ref()),
        email: format!("{}@example.com", role.as_ref()),
        role,
    }
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    user_id: Option<UserId>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header(USER_ID_HEADER, user_id.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
