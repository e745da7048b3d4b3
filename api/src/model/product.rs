use chrono::{DateTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    auth::Principal,
    id::{ProductId, UserId},
    list::PaginatedList,
    product::{
        event::{CreateProduct, UpdateProduct},
        Product, ProductListOptions, ProductSort, ProductStatus,
    },
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::{optional_positive_money, positive_money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatusName {
    Available,
    Rented,
    Deleted,
}

impl From<ProductStatus> for ProductStatusName {
    fn from(value: ProductStatus) -> Self {
        match value {
            ProductStatus::Available => Self::Available,
            ProductStatus::Rented => Self::Rented,
            ProductStatus::Deleted => Self::Deleted,
        }
    }
}

impl From<ProductStatusName> for ProductStatus {
    fn from(value: ProductStatusName) -> Self {
        match value {
            ProductStatusName::Available => Self::Available,
            ProductStatusName::Rented => Self::Rented,
            ProductStatusName::Deleted => Self::Deleted,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductSortName {
    #[default]
    Newest,
    NameAsc,
    RateAsc,
    RateDesc,
}

impl From<ProductSortName> for ProductSort {
    fn from(value: ProductSortName) -> Self {
        match value {
            ProductSortName::Newest => Self::Newest,
            ProductSortName::NameAsc => Self::NameAsc,
            ProductSortName::RateAsc => Self::RateAsc,
            ProductSortName::RateDesc => Self::RateDesc,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(skip)]
    #[serde(default)]
    pub description: String,
    #[garde(custom(positive_money))]
    pub daily_rate: Decimal,
}

#[derive(new)]
pub struct CreateProductRequestWithPrincipal(Principal, CreateProductRequest);
impl From<CreateProductRequestWithPrincipal> for CreateProduct {
    fn from(value: CreateProductRequestWithPrincipal) -> Self {
        let CreateProductRequestWithPrincipal(
            requested_by,
            CreateProductRequest {
                name,
                description,
                daily_rate,
            },
        ) = value;
        CreateProduct {
            name,
            description,
            daily_rate,
            requested_by,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[garde(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(custom(optional_positive_money))]
    pub daily_rate: Option<Decimal>,
}

#[derive(new)]
pub struct UpdateProductRequestWithIds(ProductId, Principal, UpdateProductRequest);
impl From<UpdateProductRequestWithIds> for UpdateProduct {
    fn from(value: UpdateProductRequestWithIds) -> Self {
        let UpdateProductRequestWithIds(
            product_id,
            requested_by,
            UpdateProductRequest {
                name,
                description,
                daily_rate,
            },
        ) = value;
        UpdateProduct {
            product_id,
            name,
            description,
            daily_rate,
            requested_by,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    #[garde(skip)]
    pub status: Option<ProductStatusName>,
    #[garde(length(max = 255))]
    pub q: Option<String>,
    #[garde(custom(optional_positive_money))]
    pub max_daily_rate: Option<Decimal>,
    #[garde(skip)]
    #[serde(default)]
    pub sort: ProductSortName,
    #[garde(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[garde(range(min = 0))]
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl From<ProductListQuery> for ProductListOptions {
    fn from(value: ProductListQuery) -> Self {
        let ProductListQuery {
            status,
            q,
            max_daily_rate,
            sort,
            limit,
            offset,
        } = value;
        Self {
            status: status.map(ProductStatus::from),
            name_contains: q.filter(|q| !q.trim().is_empty()),
            max_daily_rate,
            sort: sort.into(),
            limit,
            offset,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub daily_rate: Decimal,
    pub status: ProductStatusName,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(value: Product) -> Self {
        let Product {
            product_id,
            name,
            description,
            daily_rate,
            status,
            created_by,
            created_at,
        } = value;
        Self {
            product_id,
            name,
            description,
            daily_rate,
            status: status.into(),
            created_by,
            created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedProductResponse {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub items: Vec<ProductResponse>,
}

impl From<PaginatedList<Product>> for PaginatedProductResponse {
    fn from(value: PaginatedList<Product>) -> Self {
        let PaginatedList {
            total,
            limit,
            offset,
            items,
        } = value;
        Self {
            total,
            limit,
            offset,
            items: items.into_iter().map(ProductResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreatedResponse {
    pub product_id: ProductId,
}
