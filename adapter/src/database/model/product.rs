use kernel::model::{
    id::{ProductId, UserId},
    product::{Product, ProductStatus},
};
use shared::error::AppError;
use sqlx::types::{
    chrono::{DateTime, Utc},
    Decimal,
};
use std::str::FromStr;

#[derive(sqlx::FromRow)]
pub struct ProductRow {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub daily_rate: Decimal,
    pub status: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = AppError;

    fn try_from(value: ProductRow) -> Result<Self, Self::Error> {
        let ProductRow {
            product_id,
            name,
            description,
            daily_rate,
            status,
            created_by,
            created_at,
        } = value;
        let status = ProductStatus::from_str(&status).map_err(|_| {
            AppError::ConversionEntityError(format!("unknown product status: {status}"))
        })?;
        Ok(Product {
            product_id,
            name,
            description,
            daily_rate,
            status,
            created_by,
            created_at,
        })
    }
}

// ページネーション用の adapter 内部の型。総件数をウィンドウ関数で同時に取得する
#[derive(sqlx::FromRow)]
pub struct PaginatedProductRow {
    pub total: i64,
    #[sqlx(flatten)]
    pub product: ProductRow,
}
