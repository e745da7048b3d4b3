use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::UserId,
    role::Role,
    user::{
        event::{CreateUser, DeleteUser, UpdateUserProfile, UpdateUserRole},
        User,
    },
};
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::user::UserRow, ConnectionPool};

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, event: CreateUser) -> AppResult<User> {
        // 自己登録したユーザーは常に client として作成する
        let row = sqlx::query_as::<_, UserRow>(
            r#"
                INSERT INTO users (user_name, email, role)
                VALUES ($1, $2, $3)
                RETURNING user_id, user_name, email, role
            "#,
        )
        .bind(&event.user_name)
        .bind(&event.email)
        .bind(Role::Client.as_ref())
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(|e| map_constraint_error(e, "email is already registered"))?;

        User::try_from(row)
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
                SELECT user_id, user_name, email, role
                FROM users
                ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .into_iter()
        .map(User::try_from)
        .collect()
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
                SELECT user_id, user_name, email, role
                FROM users
                WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(User::try_from)
        .transpose()
    }

    async fn update_profile(&self, event: UpdateUserProfile) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE users
                SET
                    user_name = COALESCE($2, user_name),
                    email = COALESCE($3, email)
                WHERE user_id = $1
            "#,
        )
        .bind(event.user_id)
        .bind(event.user_name)
        .bind(event.email)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_constraint_error(e, "email is already registered"))?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified user not found".into()));
        }
        Ok(())
    }

    async fn update_role(&self, event: UpdateUserRole) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE users
                SET role = $2
                WHERE user_id = $1
            "#,
        )
        .bind(event.user_id)
        .bind(event.role.as_ref())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified user not found".into()));
        }
        Ok(())
    }

    async fn delete(&self, event: DeleteUser) -> AppResult<()> {
        let res = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(event.user_id)
            .execute(self.db.inner_ref())
            .await
            .map_err(|e| map_constraint_error(e, "user still owns products or bookings"))?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified user not found".into()));
        }
        Ok(())
    }
}

// 一意制約・外部キー制約の違反は利用者起因のエラーとして返す
pub(crate) fn map_constraint_error(e: sqlx::Error, message: &str) -> AppError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() || db.is_foreign_key_violation() => {
            AppError::UnprocessableEntity(message.into())
        }
        _ => AppError::SpecificOperationError(e),
    }
}
