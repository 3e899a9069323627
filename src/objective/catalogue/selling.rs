use crate::{
    objective::error::SchedulerError,
    world::{ports::GameWorld, types::ProductId},
};

const MARKET_FEE_PERCENT: i64 = 10;

/// Sells surplus of `product` and returns how many units went to the market.
///
/// `requested = None` sells everything above the reserve floor. The amount
/// never dips below the reserve floor of the potential quantity, never exceeds
/// real stock, and is capped by the cash needed to pay the market fee up
/// front. Amounts not above the market's minimum sell quantity are kept
/// unless the fee cap was applied.
pub fn sell_surplus(
    world: &mut dyn GameWorld,
    product: ProductId,
    requested: Option<i64>,
) -> Result<i64, SchedulerError> {
    let real_stock = world.stock(product);
    if real_stock <= 0 {
        return Ok(0);
    }

    let sellable = world.potential_quantity(product) - world.reserve_floor(product);
    let mut amount = match requested {
        Some(requested) if requested <= sellable => requested,
        _ => sellable,
    };
    if amount <= 0 {
        return Ok(0);
    }
    amount = amount.min(real_stock);

    let Some(price) = world.sell_price(product) else {
        return Ok(0);
    };
    if price <= 0 {
        return Ok(0);
    }

    let money = world.money();
    let mut fee_capped = false;
    if price * amount * MARKET_FEE_PERCENT / 100 > money {
        amount = money.max(0) * 100 / (price * MARKET_FEE_PERCENT);
        fee_capped = true;
    }
    if amount <= 0 || !(amount > world.min_sell_quantity() || fee_capped) {
        return Ok(0);
    }

    world.sell(product, amount, price)?;
    tracing::debug!(
        target: "objective",
        product = %product,
        quantity = amount,
        price = price,
        fee_capped = fee_capped,
        "surplus_sold"
    );
    Ok(amount)
}
