use std::fmt;

use crate::{
    ledger::{Holder, Priority},
    objective::{
        catalogue::farm_money::FarmMoney, context::TickContext, error::SchedulerError, goal::Goal,
        node::Objective, types::ObjectiveKind,
    },
};

/// Ever-present goal that keeps an unbounded [`FarmMoney`] running.
#[derive(Debug, Clone, Copy, Default)]
pub struct FarmMoneyMain;

impl FarmMoneyMain {
    pub fn objective(ctx: &mut TickContext<'_>, priority: Priority) -> Objective {
        let holder = ctx.register_holder(priority);
        let farm_money = FarmMoney::objective(ctx, priority, None, true);
        Objective::new(holder, FarmMoneyMain).with_prerequisite(farm_money)
    }
}

impl fmt::Display for FarmMoneyMain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FarmMoneyMain")
    }
}

impl Goal for FarmMoneyMain {
    fn kind(&self) -> ObjectiveKind {
        ObjectiveKind::FarmMoneyMain
    }

    // The prerequisite never completes, so this is only consulted if it is removed.
    fn is_reached(
        &mut self,
        _holder: &Holder,
        _ctx: &mut TickContext<'_>,
    ) -> Result<bool, SchedulerError> {
        Ok(true)
    }
}
