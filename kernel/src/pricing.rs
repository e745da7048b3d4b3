//! 料金計算と空き状況判定。
//!
//! I/O も共有状態も持たない純粋な関数の集まりで、任意のタスクから並行に呼び出せる。
//! 「貸出中予約の読み出し → 判定 → 登録」を商品ごとに直列化するのは呼び出し側
//! （adapter のトランザクション）の責務である。

use crate::model::{
    booking::{BookedInterval, Booking, BookingRejection, BookingRequest, Quote, Settlement},
    product::{Product, ProductStatus},
};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use shared::config::PricingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    pub free_days: i64,
    pub max_duration_days: i64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingConfig::default().into()
    }
}

impl From<PricingConfig> for PricingPolicy {
    fn from(value: PricingConfig) -> Self {
        Self {
            free_days: i64::from(value.free_days),
            max_duration_days: i64::from(value.max_duration_days),
        }
    }
}

impl PricingPolicy {
    /// 貸出日数から料金を求める。段階割引は無料日数を差し引く前の日数で決まる。
    /// 金額が Decimal の表現範囲を超える場合は InvalidRequest を返す。
    pub fn price(&self, daily_rate: Decimal, days: i64) -> Result<Decimal, BookingRejection> {
        let days = days.max(1);
        let billable_days = (days - self.free_days).max(0);

        let mut total = Decimal::from(billable_days)
            .checked_mul(daily_rate)
            .and_then(|t| t.checked_mul(Decimal::ONE - tier_discount(days)))
            .ok_or_else(price_out_of_range)?;
        if days > 7 {
            total = total
                .checked_mul(Decimal::new(9, 1))
                .ok_or_else(price_out_of_range)?;
        }
        Ok(floor_to_cent(total))
    }
}

fn tier_discount(days: i64) -> Decimal {
    match days {
        4..=7 => Decimal::new(4, 2),
        8..=14 => Decimal::new(2, 2),
        15..=30 => Decimal::new(1, 2),
        _ => Decimal::ZERO,
    }
}

fn price_out_of_range() -> BookingRejection {
    BookingRejection::InvalidRequest("price exceeds the supported range".into())
}

fn late_surcharge_rate() -> Decimal {
    Decimal::new(120, 2)
}

/// セント未満を切り捨てて小数 2 桁に揃える。切り上げは行わない。
pub fn floor_to_cent(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::ToNegativeInfinity);
    rounded.rescale(2);
    rounded
}

pub fn rental_days(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
    (end_date - start_date).num_days().max(1)
}

pub fn evaluate_booking_request(
    policy: &PricingPolicy,
    product: &Product,
    request: &BookingRequest,
    open_bookings: &[BookedInterval],
    today: NaiveDate,
) -> Result<Quote, BookingRejection> {
    let start_date = request
        .start_date
        .ok_or_else(|| BookingRejection::InvalidRequest("startDate is required".into()))?;
    let end_date = request
        .end_date
        .ok_or_else(|| BookingRejection::InvalidRequest("endDate is required".into()))?;

    if product.daily_rate <= Decimal::ZERO {
        return Err(BookingRejection::InvalidRequest(format!(
            "product {} has no positive daily rate",
            product.product_id
        )));
    }
    if start_date < today {
        return Err(BookingRejection::InvalidRequest(format!(
            "startDate {start_date} is in the past"
        )));
    }
    if end_date <= start_date {
        return Err(BookingRejection::InvalidRequest(format!(
            "endDate {end_date} must be after startDate {start_date}"
        )));
    }

    let days = rental_days(start_date, end_date);
    if days > policy.max_duration_days {
        return Err(BookingRejection::DurationExceeded {
            days,
            max: policy.max_duration_days,
        });
    }

    if product.status == ProductStatus::Deleted {
        return Err(BookingRejection::ProductUnavailable(format!(
            "product {} has been deleted",
            product.product_id
        )));
    }
    if let Some(conflict) = open_bookings
        .iter()
        .find(|b| b.overlaps(start_date, end_date))
    {
        return Err(BookingRejection::ProductUnavailable(format!(
            "already booked from {} to {}",
            conflict.start_date, conflict.planned_return_date
        )));
    }

    Ok(Quote {
        start_date,
        end_date,
        total_days: days,
        total_price: policy.price(product.daily_rate, days)?,
    })
}

pub fn finalize_booking(
    policy: &PricingPolicy,
    booking: &Booking,
    product: &Product,
    actual_return_date: NaiveDate,
    manual_surcharge: Option<Decimal>,
) -> Result<Settlement, BookingRejection> {
    if !booking.is_open() {
        return Err(BookingRejection::AlreadyFinalized);
    }
    if actual_return_date < booking.start_date {
        return Err(BookingRejection::InvalidRequest(format!(
            "return date {actual_return_date} precedes start date {}",
            booking.start_date
        )));
    }
    let surcharge = manual_surcharge.unwrap_or(Decimal::ZERO);
    if surcharge < Decimal::ZERO {
        return Err(BookingRejection::InvalidRequest(
            "manualSurcharge must not be negative".into(),
        ));
    }

    // 基準は実際の返却日ではなく予定期間の料金
    let planned_days = rental_days(booking.start_date, booking.planned_return_date);
    let mut total = policy
        .price(product.daily_rate, planned_days)?
        .checked_add(surcharge)
        .ok_or_else(price_out_of_range)?;

    let realized_days = (actual_return_date - booking.start_date).num_days();
    let late = actual_return_date > booking.planned_return_date
        || realized_days > policy.max_duration_days;
    if late {
        total = total
            .checked_mul(late_surcharge_rate())
            .ok_or_else(price_out_of_range)?;
    }

    Ok(Settlement {
        final_price: floor_to_cent(total),
        late,
    })
}
