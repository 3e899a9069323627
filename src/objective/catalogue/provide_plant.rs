use std::fmt;

use crate::{
    ledger::{Holder, Priority, ResourceKey},
    objective::{
        catalogue::farm_money::FarmMoney,
        context::TickContext,
        error::{SchedulerError, invalid_request},
        goal::Goal,
        node::Objective,
        types::ObjectiveKind,
    },
    world::types::{Cents, ProductId},
};

/// Buys seed stock of a product the farm does not own at all.
///
/// Money is farmed by a prerequisite; the purchase is the terminal action.
#[derive(Debug, Clone)]
pub struct ProvidePlant {
    product: ProductId,
    quantity: i64,
    seed_cost: Cents,
    usable_money: i64,
}

impl ProvidePlant {
    pub fn objective(
        ctx: &mut TickContext<'_>,
        priority: Priority,
        product: ProductId,
    ) -> Result<Objective, SchedulerError> {
        let info = ctx
            .world
            .product(product)
            .ok_or_else(|| invalid_request(format!("cannot provide unknown {product}")))?;
        let quantity = ctx.config.provide_plant_quantity;
        let seed_cost = info.npc_price * quantity;

        let holder = ctx.register_holder(priority);
        let farm_money = FarmMoney::objective(ctx, priority, Some(seed_cost), true);
        Ok(Objective::new(
            holder,
            ProvidePlant {
                product,
                quantity,
                seed_cost,
                usable_money: 0,
            },
        )
        .with_prerequisite(farm_money))
    }
}

impl fmt::Display for ProvidePlant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProvidePlant(product={}, quantity={})",
            self.product, self.quantity
        )
    }
}

impl Goal for ProvidePlant {
    fn kind(&self) -> ObjectiveKind {
        ObjectiveKind::ProvidePlant(self.product)
    }

    fn is_reached(
        &mut self,
        _holder: &Holder,
        ctx: &mut TickContext<'_>,
    ) -> Result<bool, SchedulerError> {
        Ok(ctx.world.money() - ctx.world.protected_money_floor() >= self.seed_cost)
    }

    fn get_finish_reservations(
        &mut self,
        holder: &Holder,
        ctx: &mut TickContext<'_>,
    ) -> Result<bool, SchedulerError> {
        self.usable_money = ctx.reserve(holder, ResourceKey::Money, self.seed_cost)?;
        Ok(self.usable_money >= self.seed_cost)
    }

    fn finish(&mut self, holder: &Holder, ctx: &mut TickContext<'_>) -> Result<(), SchedulerError> {
        let bought = ctx
            .world
            .buy_cheapest(self.product, self.quantity, self.usable_money)?;
        ctx.free(holder, ResourceKey::Money);
        tracing::info!(
            target: "objective",
            holder = %holder,
            product = %self.product,
            bought = bought,
            budget = self.usable_money,
            "plant_provided"
        );
        Ok(())
    }

    // Money comes from the prerequisite and the purchase happens in `finish`.
    fn get_work_reservations(
        &mut self,
        _holder: &Holder,
        _ctx: &mut TickContext<'_>,
    ) -> Result<bool, SchedulerError> {
        Ok(false)
    }
}
