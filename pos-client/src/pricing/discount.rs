//! Discount calculator
//!
//! Discounts adjust the hourly rate before it is multiplied by elapsed
//! hours; they never touch the accumulated order subtotal.

use shared::models::DiscountType;

/// Hourly rate after applying a discount, floor-clamped at 0
pub fn effective_rate(discount_type: DiscountType, magnitude: f64, base_rate: i64) -> i64 {
    match discount_type {
        DiscountType::Vnd => base_rate.saturating_sub(magnitude.round() as i64).max(0),
        DiscountType::Percent => {
            let result = (base_rate as f64 * (1.0 - magnitude / 100.0)).round() as i64;
            result.max(0)
        }
    }
}

/// Rate for a room given its optional discount fields
pub fn discounted_rate(
    discount_type: Option<DiscountType>,
    discount_value: Option<f64>,
    base_rate: i64,
) -> i64 {
    match (discount_type, discount_value) {
        (Some(ty), Some(value)) => effective_rate(ty, value, base_rate),
        _ => base_rate,
    }
}
