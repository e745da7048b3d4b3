use crate::model::{
    id::{BookingId, ProductId, UserId},
    user::BookingRenter,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::error::AppError;
use thiserror::Error;

pub mod event;

#[derive(Debug, Clone)]
pub struct Booking {
    pub booking_id: BookingId,
    pub renter: BookingRenter,
    pub product: BookingProduct,
    pub start_date: NaiveDate,
    pub planned_return_date: NaiveDate,
    // None の間は貸出中
    pub actual_return_date: Option<NaiveDate>,
    pub total_price: Decimal,
    pub final_price: Option<Decimal>,
    pub manual_surcharge: Option<Decimal>,
    pub finalized_by: Option<UserId>,
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    pub fn state(&self) -> BookingState {
        match self.actual_return_date {
            None => BookingState::Open,
            Some(_) => BookingState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == BookingState::Open
    }

    pub fn interval(&self) -> BookedInterval {
        BookedInterval {
            start_date: self.start_date,
            planned_return_date: self.planned_return_date,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookingProduct {
    pub product_id: ProductId,
    pub name: String,
    pub daily_rate: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    Open,
    Closed,
}

/// 既存の貸出中予約が占有している期間。終端は含まない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookedInterval {
    pub start_date: NaiveDate,
    pub planned_return_date: NaiveDate,
}

impl BookedInterval {
    // 片方の終端がもう片方の始端以前なら重ならない（境界日の接触は重複とみなさない）
    pub fn overlaps(&self, start_date: NaiveDate, end_date: NaiveDate) -> bool {
        !(self.planned_return_date <= start_date || end_date <= self.start_date)
    }
}

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i64,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub final_price: Decimal,
    pub late: bool,
}

#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub booking_id: BookingId,
    pub quote: Quote,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingRejection {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("rental duration of {days} days exceeds the maximum of {max} days")]
    DurationExceeded { days: i64, max: i64 },
    #[error("product is not available: {0}")]
    ProductUnavailable(String),
    #[error("booking has already been finalized")]
    AlreadyFinalized,
}

impl BookingRejection {
    pub fn code(&self) -> &'static str {
        match self {
            BookingRejection::InvalidRequest(_) => "InvalidRequest",
            BookingRejection::DurationExceeded { .. } => "DurationExceeded",
            BookingRejection::ProductUnavailable(_) => "ProductUnavailable",
            BookingRejection::AlreadyFinalized => "AlreadyFinalized",
        }
    }
}

impl From<BookingRejection> for AppError {
    fn from(value: BookingRejection) -> Self {
        let message = value.to_string();
        match value {
            BookingRejection::InvalidRequest(_) => AppError::InvalidRequest(message),
            BookingRejection::DurationExceeded { .. } => AppError::DurationExceeded(message),
            BookingRejection::ProductUnavailable(_) => AppError::ProductUnavailable(message),
            BookingRejection::AlreadyFinalized => AppError::AlreadyFinalized(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, d).unwrap()
    }

    fn interval(start: u32, end: u32) -> BookedInterval {
        BookedInterval {
            start_date: day(start),
            planned_return_date: day(end),
        }
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        assert!(!interval(1, 5).overlaps(day(5), day(10)));
        assert!(!interval(5, 10).overlaps(day(1), day(5)));
    }

    #[test]
    fn overlap_is_symmetric() {
        assert!(interval(1, 5).overlaps(day(4), day(8)));
        assert!(interval(4, 8).overlaps(day(1), day(5)));
        // 包含関係も重複とみなす
        assert!(interval(1, 10).overlaps(day(3), day(4)));
        assert!(interval(3, 4).overlaps(day(1), day(10)));
    }

    #[test]
    fn rejection_converts_to_matching_app_error() {
        let err: AppError = BookingRejection::AlreadyFinalized.into();
        assert_eq!(err.code(), "AlreadyFinalized");
        let err: AppError = BookingRejection::DurationExceeded { days: 90, max: 60 }.into();
        assert_eq!(err.code(), "DurationExceeded");
    }
}
