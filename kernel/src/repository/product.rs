use crate::model::{
    id::ProductId,
    list::PaginatedList,
    product::{
        event::{CreateProduct, DeleteProduct, UpdateProduct},
        Product, ProductListOptions,
    },
};
use async_trait::async_trait;
use shared::error::AppResult;

#[mockall::automock]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, event: CreateProduct) -> AppResult<ProductId>;
    async fn find_all(&self, options: ProductListOptions) -> AppResult<PaginatedList<Product>>;
    async fn find_by_id(&self, product_id: ProductId) -> AppResult<Option<Product>>;
    async fn update(&self, event: UpdateProduct) -> AppResult<()>;
    // 論理削除（status を deleted にする）
    async fn delete(&self, event: DeleteProduct) -> AppResult<()>;
}
