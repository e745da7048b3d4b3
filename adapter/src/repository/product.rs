use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::ProductId,
    list::PaginatedList,
    product::{
        event::{CreateProduct, DeleteProduct, UpdateProduct},
        Product, ProductListOptions, ProductStatus,
    },
};
use kernel::repository::product::ProductRepository;
use shared::error::{AppError, AppResult};

use crate::database::{
    model::product::{PaginatedProductRow, ProductRow},
    ConnectionPool,
};

#[derive(new)]
pub struct ProductRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ProductRepository for ProductRepositoryImpl {
    async fn create(&self, event: CreateProduct) -> AppResult<ProductId> {
        sqlx::query_scalar::<_, ProductId>(
            r#"
                INSERT INTO products (name, description, daily_rate, status, created_by)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING product_id
            "#,
        )
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.daily_rate)
        .bind(ProductStatus::Available.as_ref())
        .bind(event.requested_by.user_id)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)
    }

    async fn find_all(&self, options: ProductListOptions) -> AppResult<PaginatedList<Product>> {
        let ProductListOptions {
            status,
            name_contains,
            max_daily_rate,
            sort,
            limit,
            offset,
        } = options;

        // ORDER BY 句は ProductSort が返す固定文字列のみ。値はすべてバインドする
        let sql = format!(
            r#"
                SELECT
                    COUNT(*) OVER() AS total,
                    p.product_id,
                    p.name,
                    p.description,
                    p.daily_rate,
                    p.status,
                    p.created_by,
                    p.created_at
                FROM products AS p
                WHERE (($1::VARCHAR IS NULL AND p.status <> 'deleted') OR p.status = $1)
                  AND ($2::VARCHAR IS NULL OR p.name ILIKE $2)
                  AND ($3::NUMERIC IS NULL OR p.daily_rate <= $3)
                ORDER BY {}
                LIMIT $4
                OFFSET $5
            "#,
            sort.order_by_clause()
        );

        let rows = sqlx::query_as::<_, PaginatedProductRow>(&sql)
            .bind(status.map(|s| s.as_ref().to_string()))
            .bind(name_contains.map(|q| format!("%{}%", escape_like(&q))))
            .bind(max_daily_rate)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        let total = rows.first().map(|r| r.total).unwrap_or_default();
        let items = rows
            .into_iter()
            .map(|r| Product::try_from(r.product))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedList {
            total,
            limit,
            offset,
            items,
        })
    }

    async fn find_by_id(&self, product_id: ProductId) -> AppResult<Option<Product>> {
        sqlx::query_as::<_, ProductRow>(
            r#"
                SELECT
                    product_id,
                    name,
                    description,
                    daily_rate,
                    status,
                    created_by,
                    created_at
                FROM products
                WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(Product::try_from)
        .transpose()
    }

    async fn update(&self, event: UpdateProduct) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE products
                SET
                    name = COALESCE($2, name),
                    description = COALESCE($3, description),
                    daily_rate = COALESCE($4, daily_rate)
                WHERE product_id = $1
                  AND status <> 'deleted'
            "#,
        )
        .bind(event.product_id)
        .bind(event.name)
        .bind(event.description)
        .bind(event.daily_rate)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified product not found".into()));
        }
        tracing::info!(
            product_id = %event.product_id,
            updated_by = %event.requested_by.user_id,
            "product updated"
        );
        Ok(())
    }

    async fn delete(&self, event: DeleteProduct) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // 予約登録と競合しないよう商品を行ロックしてから貸出中予約を確認する
        {
            let locked = sqlx::query_scalar::<_, ProductId>(
                r#"
                    SELECT product_id
                    FROM products
                    WHERE product_id = $1 AND status <> 'deleted'
                    FOR UPDATE
                "#,
            )
            .bind(event.product_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if locked.is_none() {
                return Err(AppError::EntityNotFound(format!(
                    "product ({}) not found",
                    event.product_id
                )));
            }

            let open_bookings = sqlx::query_scalar::<_, i64>(
                r#"
                    SELECT COUNT(*)
                    FROM bookings
                    WHERE product_id = $1 AND actual_return_date IS NULL
                "#,
            )
            .bind(event.product_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if open_bookings > 0 {
                return Err(AppError::UnprocessableEntity(format!(
                    "product ({}) still has {open_bookings} open bookings",
                    event.product_id
                )));
            }
        }

        let res = sqlx::query("UPDATE products SET status = $2 WHERE product_id = $1")
            .bind(event.product_id)
            .bind(ProductStatus::Deleted.as_ref())
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No product record has been deleted".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;
        tracing::info!(
            product_id = %event.product_id,
            deleted_by = %event.requested_by.user_id,
            "product deleted"
        );
        Ok(())
    }
}

// ILIKE のワイルドカードを利用者の入力から取り除く
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::user::UserRepositoryImpl;
    use kernel::model::{
        auth::Principal, product::ProductSort, role::Role, user::event::CreateUser,
    };
    use kernel::repository::user::UserRepository;
    use rust_decimal::Decimal;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_register_and_list_products(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let db = ConnectionPool::new(pool);
        let agent = UserRepositoryImpl::new(db.clone())
            .create(CreateUser {
                user_name: "Agent".into(),
                email: "agent@example.com".into(),
            })
            .await?;
        let principal = Principal::new(agent.user_id, Role::Agent);
        let repo = ProductRepositoryImpl::new(db);

        for (name, rate) in [("Kayak", 35), ("Bicycle", 12), ("Drill", 8)] {
            repo.create(CreateProduct {
                name: name.into(),
                description: format!("{name} for rent"),
                daily_rate: Decimal::from(rate),
                requested_by: principal,
            })
            .await?;
        }

        let list = repo
            .find_all(ProductListOptions {
                sort: ProductSort::RateAsc,
                ..Default::default()
            })
            .await?;
        assert_eq!(list.total, 3);
        let names: Vec<_> = list.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Drill", "Bicycle", "Kayak"]);

        let cheap = repo
            .find_all(ProductListOptions {
                max_daily_rate: Some(Decimal::from(12)),
                name_contains: Some("bi".into()),
                ..Default::default()
            })
            .await?;
        assert_eq!(cheap.items.len(), 1);
        assert_eq!(cheap.items[0].name, "Bicycle");

        let kayak_id = list.items[2].product_id;
        repo.delete(DeleteProduct {
            product_id: kayak_id,
            requested_by: principal,
        })
        .await?;
        let after = repo.find_all(ProductListOptions::default()).await?;
        assert_eq!(after.total, 2);
        let kayak = repo.find_by_id(kayak_id).await?.unwrap();
        assert_eq!(kayak.status, ProductStatus::Deleted);
        Ok(())
    }
}
