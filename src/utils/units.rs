//! 人类可读金额与链上 nano 单位之间的换算
//!
//! 所有计算都基于 `rust_decimal`，不经过浮点数。

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::common::error::{SwapError, SwapResult};
use crate::constants::{NANO_DECIMALS, NANO_PER_UNIT};

/// 人类可读金额（TON 或 jetton）
pub type Amount = Decimal;

/// 链上最小单位的整数数量
pub type NanoAmount = u128;

/// Amount -> NanoAmount
///
/// 先向零截断到 9 位小数（不会向上取整），再乘以 10^9。
/// 负数或超出可表示范围时返回 `InvalidAmount`。
pub fn to_nano(amount: Amount) -> SwapResult<NanoAmount> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(SwapError::InvalidAmount(format!("negative amount {amount}")));
    }

    let truncated = amount.round_dp_with_strategy(NANO_DECIMALS, RoundingStrategy::ToZero);
    let scaled = truncated
        .checked_mul(Decimal::from(NANO_PER_UNIT as u64))
        .ok_or_else(|| SwapError::InvalidAmount(format!("amount {amount} overflows nano units")))?;

    scaled
        .trunc()
        .to_u128()
        .ok_or_else(|| SwapError::InvalidAmount(format!("amount {amount} is not representable")))
}

/// NanoAmount -> Amount，精确除以 10^9
pub fn to_amount(nano: NanoAmount) -> SwapResult<Amount> {
    let mantissa = i128::try_from(nano)
        .map_err(|_| SwapError::InvalidAmount(format!("nano amount {nano} out of range")))?;
    Decimal::try_from_i128_with_scale(mantissa, NANO_DECIMALS)
        .map(|d| d.normalize())
        .map_err(|e| SwapError::InvalidAmount(format!("nano amount {nano}: {e}")))
}

/// 解析 API 返回的整数字符串单位（如 `"950000000"`）
pub fn parse_nano(units: &str) -> SwapResult<NanoAmount> {
    units
        .trim()
        .parse::<u128>()
        .map_err(|e| SwapError::InvalidAmount(format!("bad integer units '{units}': {e}")))
}

/// 解析整数字符串单位并换算成 Amount
#[inline]
pub fn units_to_amount(units: &str) -> SwapResult<Amount> {
    to_amount(parse_nano(units)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_trip_for_representable_amounts() {
        for a in [dec!(0), dec!(1), dec!(1.5), dec!(0.000000001), dec!(123456.789012345)] {
            let nano = to_nano(a).unwrap();
            assert_eq!(to_amount(nano).unwrap(), a, "round trip mismatch for {a}");
        }
    }

    #[test]
    fn test_truncates_toward_zero() {
        assert_eq!(to_nano(dec!(1.9999999995)).unwrap(), to_nano(dec!(1.999999999)).unwrap());
        assert_eq!(to_nano(dec!(1.9999999995)).unwrap(), 1_999_999_999);
        assert_eq!(to_nano(dec!(0.0000000009)).unwrap(), 0);
    }

    #[test]
    fn test_negative_is_invalid() {
        assert!(matches!(to_nano(dec!(-0.5)), Err(SwapError::InvalidAmount(_))));
        assert!(matches!(to_nano(dec!(-1)), Err(SwapError::InvalidAmount(_))));
    }

    #[test]
    fn test_overflow_is_invalid() {
        assert!(matches!(to_nano(Decimal::MAX), Err(SwapError::InvalidAmount(_))));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(units_to_amount("950000000").unwrap(), dec!(0.95));
        assert!(parse_nano("12.5").is_err());
        assert!(parse_nano("-1").is_err());
    }
}
