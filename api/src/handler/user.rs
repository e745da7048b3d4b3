use crate::{
    extractor::{AuthorizedUser, JsonBody, PathParam},
    model::{
        booking::BookingsResponse,
        user::{
            CreateUserRequest, UpdateUserProfileRequest, UpdateUserProfileRequestWithUserId,
            UpdateUserRoleRequest, UpdateUserRoleRequestWithUserId, UserResponse, UsersResponse,
        },
    },
};
use axum::{extract::State, http::StatusCode, Json};
use garde::Validate;
use kernel::model::{id::UserId, user::event::DeleteUser};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

#[tracing::instrument(skip(registry, req))]
pub async fn register_user(
    State(registry): State<AppRegistry>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    req.validate(&())?;

    let registered_user = registry.user_repository().create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(registered_user.into())))
}

pub async fn list_users(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UsersResponse>> {
    user.require_admin()?;

    registry
        .user_repository()
        .find_all()
        .await
        .map(UsersResponse::from)
        .map(Json)
}

pub async fn get_current_user(user: AuthorizedUser) -> Json<UserResponse> {
    Json(UserResponse::from(user.user))
}

#[tracing::instrument(skip(user, registry, req), fields(principal = %user.id()))]
pub async fn update_current_user(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    JsonBody(req): JsonBody<UpdateUserProfileRequest>,
) -> AppResult<StatusCode> {
    req.validate(&())?;

    registry
        .user_repository()
        .update_profile(UpdateUserProfileRequestWithUserId::new(user.id(), req).into())
        .await?;

    Ok(StatusCode::OK)
}

pub async fn get_my_bookings(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    registry
        .booking_repository()
        .find_by_user_id(user.id())
        .await
        .map(BookingsResponse::from)
        .map(Json)
}

#[tracing::instrument(skip(user, registry, req), fields(principal = %user.id()))]
pub async fn change_role(
    user: AuthorizedUser,
    PathParam(user_id): PathParam<UserId>,
    State(registry): State<AppRegistry>,
    JsonBody(req): JsonBody<UpdateUserRoleRequest>,
) -> AppResult<StatusCode> {
    user.require_admin()?;

    registry
        .user_repository()
        .update_role(UpdateUserRoleRequestWithUserId::new(user_id, req).into())
        .await?;

    Ok(StatusCode::OK)
}

#[tracing::instrument(skip(user, registry), fields(principal = %user.id()))]
pub async fn delete_user(
    user: AuthorizedUser,
    PathParam(user_id): PathParam<UserId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    user.require_admin()?;
    if user.id() == user_id {
        return Err(AppError::UnprocessableEntity(
            "administrators cannot delete themselves".into(),
        ));
    }

    registry
        .user_repository()
        .delete(DeleteUser { user_id })
        .await?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use crate::test_util::{send, user_with_role, Mocks};
    use axum::http::{Method, StatusCode};
    use kernel::model::{id::UserId, role::Role, user::User};
    use serde_json::json;

    #[tokio::test]
    async fn registration_creates_a_client() {
        let mut mocks = Mocks::default();
        mocks
            .user
            .expect_create()
            .withf(|e| e.user_name == "Alice" && e.email == "alice@example.com")
            .times(1)
            .returning(|e| {
                Ok(User {
                    user_id: UserId::new(),
                    user_name: e.user_name,
                    email: e.email,
                    role: Role::Client,
                })
            });

        let (status, body) = send(
            mocks.into_app(),
            Method::POST,
            "/api/v1/users",
            None,
            Some(json!({ "userName": "Alice", "email": "alice@example.com" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["role"], "client");
    }

    #[tokio::test]
    async fn registration_with_invalid_email_is_rejected() {
        let (status, body) = send(
            Mocks::default().into_app(),
            Method::POST,
            "/api/v1/users",
            None,
            Some(json!({ "userName": "Alice", "email": "not-an-email" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "InvalidRequest");
    }

    #[tokio::test]
    async fn only_admins_change_roles() {
        let agent = user_with_role(Role::Agent);
        let (status, _) = send(
            Mocks::default().with_user(&agent).into_app(),
            Method::PUT,
            &format!("/api/v1/users/{}/role", UserId::new()),
            Some(agent.user_id),
            Some(json!({ "role": "admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = user_with_role(Role::Admin);
        let target = UserId::new();
        let mut mocks = Mocks::default().with_user(&admin);
        mocks
            .user
            .expect_update_role()
            .withf(move |e| e.user_id == target && e.role == Role::Agent)
            .times(1)
            .returning(|_| Ok(()));
        let (status, _) = send(
            mocks.into_app(),
            Method::PUT,
            &format!("/api/v1/users/{target}/role"),
            Some(admin.user_id),
            Some(json!({ "role": "agent" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn current_user_is_resolved_from_the_store() {
        let agent = user_with_role(Role::Agent);
        let (status, body) = send(
            Mocks::default().with_user(&agent).into_app(),
            Method::GET,
            "/api/v1/users/me",
            Some(agent.user_id),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "agent");
        assert_eq!(body["userId"], agent.user_id.to_string());
    }

    #[tokio::test]
    async fn admin_cannot_delete_themselves() {
        let admin = user_with_role(Role::Admin);
        let (status, _) = send(
            Mocks::default().with_user(&admin).into_app(),
            Method::DELETE,
            &format!("/api/v1/users/{}", admin.user_id),
            Some(admin.user_id),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
