use crate::{
    extractor::{AuthorizedUser, JsonBody, PathParam, QueryParams},
    model::product::{
        CreateProductRequest, CreateProductRequestWithPrincipal, PaginatedProductResponse,
        ProductCreatedResponse, ProductListQuery, ProductResponse, UpdateProductRequest,
        UpdateProductRequestWithIds,
    },
};
use axum::{extract::State, http::StatusCode, Json};
use garde::Validate;
use kernel::model::{id::ProductId, product::event::DeleteProduct};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

#[tracing::instrument(skip(user, registry, req), fields(principal = %user.id()))]
pub async fn register_product(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    JsonBody(req): JsonBody<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ProductCreatedResponse>)> {
    user.require_catalog_manager()?;
    req.validate(&())?;

    let product_id = registry
        .product_repository()
        .create(CreateProductRequestWithPrincipal::new(user.principal(), req).into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductCreatedResponse { product_id }),
    ))
}

pub async fn show_product_list(
    _user: AuthorizedUser,
    QueryParams(query): QueryParams<ProductListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaginatedProductResponse>> {
    query.validate(&())?;

    registry
        .product_repository()
        .find_all(query.into())
        .await
        .map(PaginatedProductResponse::from)
        .map(Json)
}

pub async fn show_product(
    _user: AuthorizedUser,
    PathParam(product_id): PathParam<ProductId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ProductResponse>> {
    registry
        .product_repository()
        .find_by_id(product_id)
        .await
        .and_then(|product| match product {
            Some(product) => Ok(Json(product.into())),
            None => Err(AppError::EntityNotFound(format!(
                "product ({product_id}) not found"
            ))),
        })
}

#[tracing::instrument(skip(user, registry, req), fields(principal = %user.id()))]
pub async fn update_product(
    user: AuthorizedUser,
    PathParam(product_id): PathParam<ProductId>,
    State(registry): State<AppRegistry>,
    JsonBody(req): JsonBody<UpdateProductRequest>,
) -> AppResult<StatusCode> {
    user.require_catalog_manager()?;
    req.validate(&())?;

    let update_product = UpdateProductRequestWithIds::new(product_id, user.principal(), req);
    registry
        .product_repository()
        .update(update_product.into())
        .await
        .map(|_| StatusCode::OK)
}

#[tracing::instrument(skip(user, registry), fields(principal = %user.id()))]
pub async fn delete_product(
    user: AuthorizedUser,
    PathParam(product_id): PathParam<ProductId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    user.require_catalog_manager()?;

    let delete_product = DeleteProduct {
        product_id,
        requested_by: user.principal(),
    };
    registry
        .product_repository()
        .delete(delete_product)
        .await
        .map(|_| StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use crate::test_util::{send, user_with_role, Mocks};
    use axum::http::{Method, StatusCode};
    use kernel::model::{
        id::ProductId,
        list::PaginatedList,
        product::ProductSort,
        role::Role,
    };
    use rust_decimal::Decimal;
    use serde_json::json;

    #[tokio::test]
    async fn client_cannot_register_products() {
        let client = user_with_role(Role::Client);
        let app = Mocks::default().with_user(&client).into_app();

        let (status, _) = send(
            app,
            Method::POST,
            "/api/v1/products",
            Some(client.user_id),
            Some(json!({ "name": "Tent", "dailyRate": "15.00" })),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn agent_registers_a_product() {
        let agent = user_with_role(Role::Agent);
        let agent_id = agent.user_id;
        let product_id = ProductId::new();
        let mut mocks = Mocks::default().with_user(&agent);
        mocks
            .product
            .expect_create()
            .withf(move |e| {
                e.name == "Tent"
                    && e.daily_rate == Decimal::new(1550, 2)
                    && e.requested_by.user_id == agent_id
            })
            .times(1)
            .returning(move |_| Ok(product_id));

        let (status, body) = send(
            mocks.into_app(),
            Method::POST,
            "/api/v1/products",
            Some(agent_id),
            Some(json!({ "name": "Tent", "description": "2p", "dailyRate": "15.50" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["productId"], product_id.to_string());
    }

    #[tokio::test]
    async fn non_positive_or_sub_cent_rates_are_rejected() {
        let agent = user_with_role(Role::Agent);
        for rate in ["0", "-3", "1.999", "10000000000.00"] {
            let app = Mocks::default().with_user(&agent).into_app();
            let (status, body) = send(
                app,
                Method::POST,
                "/api/v1/products",
                Some(agent.user_id),
                Some(json!({ "name": "Tent", "dailyRate": rate })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "rate {rate}");
            assert_eq!(body["code"], "InvalidRequest");
        }
    }

    #[tokio::test]
    async fn list_query_is_mapped_to_typed_options() {
        let client = user_with_role(Role::Client);
        let mut mocks = Mocks::default().with_user(&client);
        mocks
            .product
            .expect_find_all()
            .withf(|o| {
                o.sort == ProductSort::RateDesc
                    && o.limit == 5
                    && o.offset == 10
                    && o.status.is_none()
                    && o.name_contains.as_deref() == Some("bike")
            })
            .times(1)
            .returning(|o| {
                Ok(PaginatedList {
                    total: 0,
                    limit: o.limit,
                    offset: o.offset,
                    items: vec![],
                })
            });

        let (status, body) = send(
            mocks.into_app(),
            Method::GET,
            "/api/v1/products?sort=rateDesc&limit=5&offset=10&q=bike",
            Some(client.user_id),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["limit"], 5);
        assert_eq!(body["items"], json!([]));
    }

    #[tokio::test]
    async fn out_of_range_limit_is_rejected() {
        let client = user_with_role(Role::Client);
        let app = Mocks::default().with_user(&client).into_app();

        let (status, _) = send(
            app,
            Method::GET,
            "/api/v1/products?limit=0",
            Some(client.user_id),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let client = user_with_role(Role::Client);
        let mut mocks = Mocks::default().with_user(&client);
        mocks.product.expect_find_by_id().returning(|_| Ok(None));

        let (status, body) = send(
            mocks.into_app(),
            Method::GET,
            &format!("/api/v1/products/{}", ProductId::new()),
            Some(client.user_id),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NotFound");
    }

    #[tokio::test]
    async fn malformed_list_query_is_reported_as_invalid_request() {
        let client = user_with_role(Role::Client);
        let app = Mocks::default().with_user(&client).into_app();

        let (status, body) = send(
            app,
            Method::GET,
            "/api/v1/products?sort=cheapest",
            Some(client.user_id),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "InvalidRequest");
    }
}
