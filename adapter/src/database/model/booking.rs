use kernel::model::{
    booking::{Booking, BookingProduct},
    id::{BookingId, ProductId, UserId},
    user::BookingRenter,
};
use sqlx::types::{
    chrono::{DateTime, NaiveDate, Utc},
    Decimal,
};

// 予約一覧・詳細の取得に使う型。商品と借り手の名前を JOIN して持つ
#[derive(sqlx::FromRow)]
pub struct BookingRow {
    pub booking_id: BookingId,
    pub product_id: ProductId,
    pub product_name: String,
    pub daily_rate: Decimal,
    pub user_id: UserId,
    pub user_name: String,
    pub start_date: NaiveDate,
    pub planned_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub total_price: Decimal,
    pub final_price: Option<Decimal>,
    pub manual_surcharge: Option<Decimal>,
    pub finalized_by: Option<UserId>,
    pub booked_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(value: BookingRow) -> Self {
        let BookingRow {
            booking_id,
            product_id,
            product_name,
            daily_rate,
            user_id,
            user_name,
            start_date,
            planned_return_date,
            actual_return_date,
            total_price,
            final_price,
            manual_surcharge,
            finalized_by,
            booked_at,
        } = value;
        Booking {
            booking_id,
            renter: BookingRenter { user_id, user_name },
            product: BookingProduct {
                product_id,
                name: product_name,
                daily_rate,
            },
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

// 重複判定に必要な列だけを取り出す型
#[derive(sqlx::FromRow)]
pub struct BookedIntervalRow {
    pub start_date: NaiveDate,
    pub planned_return_date: NaiveDate,
}

impl From<BookedIntervalRow> for kernel::model::booking::BookedInterval {
    fn from(value: BookedIntervalRow) -> Self {
        Self {
            start_date: value.start_date,
            planned_return_date: value.planned_return_date,
        }
    }
}
