use crate::model::id::{ProductId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use strum::{AsRefStr, EnumString};

pub mod event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ProductStatus {
    Available,
    Rented,
    Deleted,
}

#[derive(Debug, Clone)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub daily_rate: Decimal,
    pub status: ProductStatus,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Newest,
    NameAsc,
    RateAsc,
    RateDesc,
}

impl ProductSort {
    // 並び順は固定の ORDER BY 句にのみ対応させ、入力文字列を SQL に埋め込まない
    pub fn order_by_clause(self) -> &'static str {
        match self {
            ProductSort::Newest => "p.created_at DESC, p.product_id",
            ProductSort::NameAsc => "p.name ASC, p.product_id",
            ProductSort::RateAsc => "p.daily_rate ASC, p.product_id",
            ProductSort::RateDesc => "p.daily_rate DESC, p.product_id",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductListOptions {
    // None の場合は削除済み以外を対象にする
    pub status: Option<ProductStatus>,
    pub name_contains: Option<String>,
    pub max_daily_rate: Option<Decimal>,
    pub sort: ProductSort,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ProductListOptions {
    fn default() -> Self {
        Self {
            status: None,
            name_contains: None,
            max_daily_rate: None,
            sort: ProductSort::default(),
            limit: 20,
            offset: 0,
        }
    }
}
