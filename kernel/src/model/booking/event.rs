use crate::model::{
    auth::Principal,
    booking::BookingRequest,
    id::{BookingId, ProductId},
};
use chrono::NaiveDate;
use derive_new::new;
use rust_decimal::Decimal;

#[derive(new)]
pub struct CreateBooking {
    pub product_id: ProductId,
    pub requested_by: Principal,
    pub request: BookingRequest,
    // 過去日チェックの基準日
    pub today: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    // 借り手本人による返却
    SelfReturn,
    // agent による返却確定
    AgentFinalization,
}

#[derive(new)]
pub struct FinalizeBooking {
    pub booking_id: BookingId,
    pub requested_by: Principal,
    pub kind: ReturnKind,
    pub actual_return_date: NaiveDate,
    pub manual_surcharge: Option<Decimal>,
}
