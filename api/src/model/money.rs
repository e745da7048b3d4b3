use rust_decimal::Decimal;

// 金額列 NUMERIC(12, 2) に格納できる最大値
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

fn check_amount(value: &Decimal) -> garde::Result {
    if value.normalize().scale() > 2 {
        return Err(garde::Error::new("must have at most two fractional digits"));
    }
    if *value > MAX_AMOUNT {
        return Err(garde::Error::new(format!("must not exceed {MAX_AMOUNT}")));
    }
    Ok(())
}

// 日額は正の値で、小数点以下 2 桁まで
pub fn positive_money(value: &Decimal, _context: &()) -> garde::Result {
    if *value <= Decimal::ZERO {
        return Err(garde::Error::new("must be greater than zero"));
    }
    check_amount(value)
}

pub fn optional_positive_money(value: &Option<Decimal>, context: &()) -> garde::Result {
    match value {
        Some(v) => positive_money(v, context),
        None => Ok(()),
    }
}

// 追加料金は 0 以上
pub fn optional_non_negative_money(value: &Option<Decimal>, _context: &()) -> garde::Result {
    match value {
        Some(v) if *v < Decimal::ZERO => Err(garde::Error::new("must not be negative")),
        Some(v) => check_amount(v),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn max_amount_is_the_largest_storable_value() {
        assert_eq!(MAX_AMOUNT, Decimal::from_str("9999999999.99").unwrap());
    }

    #[test]
    fn amounts_are_bounded_by_the_column() {
        let ok = Decimal::from_str("9999999999.99").unwrap();
        let too_large = Decimal::from_str("10000000000.00").unwrap();
        assert!(positive_money(&ok, &()).is_ok());
        assert!(positive_money(&too_large, &()).is_err());
        assert!(optional_non_negative_money(&Some(too_large), &()).is_err());
        assert!(optional_non_negative_money(&Some(Decimal::MAX), &()).is_err());
    }

    #[test]
    fn surcharge_may_be_zero_but_not_negative_or_sub_cent() {
        assert!(optional_non_negative_money(&Some(Decimal::ZERO), &()).is_ok());
        assert!(optional_non_negative_money(&None, &()).is_ok());
        assert!(optional_non_negative_money(&Some(Decimal::new(-1, 0)), &()).is_err());
        assert!(optional_non_negative_money(&Some(Decimal::new(1005, 3)), &()).is_err());
    }
}
