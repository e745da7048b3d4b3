use crate::model::{auth::Principal, id::ProductId};
use rust_decimal::Decimal;

pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub daily_rate: Decimal,
    pub requested_by: Principal,
}

#[derive(Debug)]
pub struct UpdateProduct {
    pub product_id: ProductId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub daily_rate: Option<Decimal>,
    pub requested_by: Principal,
}

#[derive(Debug)]
pub struct DeleteProduct {
    pub product_id: ProductId,
    pub requested_by: Principal,
}
