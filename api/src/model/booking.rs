use chrono::{DateTime, NaiveDate, Utc};
use garde::Validate;
use kernel::model::{
    booking::{
        Booking, BookingProduct, BookingReceipt, BookingRejection, BookingRequest, BookingState,
        Quote, Settlement,
    },
    id::{BookingId, ProductId, UserId},
    user::BookingRenter,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::optional_non_negative_money;

// 日付が欠けている場合もエンジン側で InvalidRequest として判定するため Option で受ける
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[garde(skip)]
    pub start_date: Option<NaiveDate>,
    #[garde(skip)]
    pub end_date: Option<NaiveDate>,
}

impl From<CreateBookingRequest> for BookingRequest {
    fn from(value: CreateBookingRequest) -> Self {
        let CreateBookingRequest {
            start_date,
            end_date,
        } = value;
        Self {
            start_date,
            end_date,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeBookingRequest {
    // 省略時は当日を返却日とする
    #[garde(skip)]
    pub actual_return_date: Option<NaiveDate>,
    #[garde(custom(optional_non_negative_money))]
    pub manual_surcharge: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Result<Quote, BookingRejection>> for QuoteResponse {
    fn from(value: Result<Quote, BookingRejection>) -> Self {
        match value {
            Ok(Quote {
                total_days,
                total_price,
                ..
            }) => Self {
                allowed: true,
                total_days: Some(total_days),
                total_price: Some(total_price),
                reason: None,
                message: None,
            },
            Err(rejection) => Self {
                allowed: false,
                total_days: None,
                total_price: None,
                reason: Some(rejection.code()),
                message: Some(rejection.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreatedResponse {
    pub booking_id: BookingId,
    pub start_date: NaiveDate,
    pub planned_return_date: NaiveDate,
    pub total_days: i64,
    pub total_price: Decimal,
}

impl From<BookingReceipt> for BookingCreatedResponse {
    fn from(value: BookingReceipt) -> Self {
        let BookingReceipt { booking_id, quote } = value;
        Self {
            booking_id,
            start_date: quote.start_date,
            planned_return_date: quote.end_date,
            total_days: quote.total_days,
            total_price: quote.total_price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResponse {
    pub booking_id: BookingId,
    pub actual_return_date: NaiveDate,
    pub final_price: Decimal,
    pub late: bool,
}

impl SettlementResponse {
    pub fn new(booking_id: BookingId, actual_return_date: NaiveDate, settlement: Settlement) -> Self {
        Self {
            booking_id,
            actual_return_date,
            final_price: settlement.final_price,
            late: settlement.late,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStateName {
    Open,
    Closed,
}

impl From<BookingState> for BookingStateName {
    fn from(value: BookingState) -> Self {
        match value {
            BookingState::Open => Self::Open,
            BookingState::Closed => Self::Closed,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsResponse {
    pub items: Vec<BookingResponse>,
}

impl From<Vec<Booking>> for BookingsResponse {
    fn from(value: Vec<Booking>) -> Self {
        Self {
            items: value.into_iter().map(BookingResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking_id: BookingId,
    pub state: BookingStateName,
    pub renter: BookingRenterResponse,
    pub product: BookingProductResponse,
    pub start_date: NaiveDate,
    pub planned_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub total_price: Decimal,
    pub final_price: Option<Decimal>,
    pub manual_surcharge: Option<Decimal>,
    pub finalized_by: Option<UserId>,
    pub booked_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        let state = value.state().into();
        let Booking {
            booking_id,
            renter,
            product,
            start_date,
            planned_return_date,
            actual_return_date,
            total_price,
            final_price,
            manual_surcharge,
            finalized_by,
            booked_at,
        } = value;
        Self {
            booking_id,
            state,
            renter: renter.into(),
            product: product.into(),
            start_date,
            planned_return_date,
            actual_return_date,
            total_price,
            final_price,
            manual_surcharge,
            finalized_by,
            booked_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRenterResponse {
    pub user_id: UserId,
    pub user_name: String,
}

impl From<BookingRenter> for BookingRenterResponse {
    fn from(value: BookingRenter) -> Self {
        let BookingRenter { user_id, user_name } = value;
        Self { user_id, user_name }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingProductResponse {
    pub product_id: ProductId,
    pub name: String,
    pub daily_rate: Decimal,
}

impl From<BookingProduct> for BookingProductResponse {
    fn from(value: BookingProduct) -> Self {
        let BookingProduct {
            product_id,
            name,
            daily_rate,
        } = value;
        Self {
            product_id,
            name,
            daily_rate,
        }
    }
}
