use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use kernel::model::{auth::Principal, id::UserId, user::User};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

// 認証は前段のゲートウェイが行い、確認済みのユーザー ID をこのヘッダーで転送する
pub const USER_ID_HEADER: &str = "x-user-id";

pub struct AuthorizedUser {
    pub principal: Principal,
    pub user: User,
}

impl AuthorizedUser {
    pub fn id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn principal(&self) -> Principal {
        self.principal
    }

    pub fn is_admin(&self) -> bool {
        self.principal.is_admin()
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::ForbiddenOperation)
        }
    }

    pub fn require_catalog_manager(&self) -> AppResult<()> {
        if self.principal.can_manage_catalog() {
            Ok(())
        } else {
            Err(AppError::ForbiddenOperation)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppRegistry> for AuthorizedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        registry: &AppRegistry,
    ) -> Result<Self, Self::Rejection> {
        let user_id: UserId = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::UnauthenticatedError)?
            .trim()
            .parse()
            .map_err(|_| AppError::UnauthenticatedError)?;

        // ロールはヘッダーではなく保存済みのユーザー情報から解決する
        let user = registry
            .user_repository()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UnauthenticatedError)?;

        Ok(Self {
            principal: Principal::new(user.user_id, user.role),
            user,
        })
    }
}

// axum 標準の抽出器の失敗を AppError に変換し、{code, message} 形式で返す
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);
