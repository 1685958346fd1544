use alloy::primitives::U256;

use crate::config::PricingConfig;
use crate::types::PriceSignals;

/// Pick the base price from the two index signals.
/// Zero on either side means that signal is absent.
#[inline]
pub fn select(order_price: U256, item_price: U256) -> U256 {
    if order_price.is_zero() {
        item_price
    } else if item_price.is_zero() {
        order_price
    } else {
        order_price.min(item_price)
    }
}

/// floor(x * numerator / denominator). Denominator is validated non-zero at config load.
#[inline]
pub fn discount(x: U256, numerator: u64, denominator: u64) -> U256 {
    if denominator == 0 {
        return U256::ZERO;
    }
    x.saturating_mul(U256::from(numerator)) / U256::from(denominator)
}

/// Final listing price for one asset, `None` when it rounds to nothing.
pub fn listing_price(signals: PriceSignals, cfg: &PricingConfig) -> Option<U256> {
    let selected = select(signals.order_price, signals.item_price);
    let price = discount(selected, cfg.discount_numerator, cfg.discount_denominator);
    (!price.is_zero()).then_some(price)
}
