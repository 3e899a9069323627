use std::fmt;

use crate::{
    ledger::{Holder, Priority, ResourceKey},
    objective::{
        catalogue::farm_money::FarmMoney, context::TickContext, error::SchedulerError, goal::Goal,
        node::Objective, types::ObjectiveKind,
    },
    world::types::Weed,
};

#[derive(Debug, Clone)]
pub struct RemoveWeed {
    weed: Weed,
    usable_money: i64,
}

impl RemoveWeed {
    pub fn objective(ctx: &mut TickContext<'_>, priority: Priority, weed: Weed) -> Objective {
        let holder = ctx.register_holder(priority);
        let farm_money = FarmMoney::objective(ctx, priority, Some(weed.remove_cost), true);
        Objective::new(
            holder,
            RemoveWeed {
                weed,
                usable_money: 0,
            },
        )
        .with_prerequisite(farm_money)
    }
}

impl fmt::Display for RemoveWeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RemoveWeed(weed={}, cost={})",
            self.weed.id.0, self.weed.remove_cost
        )
    }
}

impl Goal for RemoveWeed {
    fn kind(&self) -> ObjectiveKind {
        ObjectiveKind::RemoveWeed(self.weed.id)
    }

    fn is_reached(
        &mut self,
        _holder: &Holder,
        _ctx: &mut TickContext<'_>,
    ) -> Result<bool, SchedulerError> {
        Ok(true)
    }

    fn get_finish_reservations(
        &mut self,
        holder: &Holder,
        ctx: &mut TickContext<'_>,
    ) -> Result<bool, SchedulerError> {
        self.usable_money = ctx.reserve(holder, ResourceKey::Money, self.weed.remove_cost)?;
        Ok(self.usable_money >= self.weed.remove_cost)
    }

    fn finish(&mut self, holder: &Holder, ctx: &mut TickContext<'_>) -> Result<(), SchedulerError> {
        ctx.world.remove_weed(&self.weed)?;
        ctx.free(holder, ResourceKey::Money);
        tracing::info!(
            target: "objective",
            holder = %holder,
            weed = self.weed.id.0,
            cost = self.weed.remove_cost,
            "weed_removed"
        );
        Ok(())
    }
}
