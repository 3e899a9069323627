use std::{collections::BTreeMap, fmt};

use crate::{
    ledger::{Holder, Priority, ResourceKey},
    objective::{
        catalogue::farm_plant::FarmPlant, context::TickContext, error::SchedulerError, goal::Goal,
        node::Objective, types::ObjectiveKind,
    },
    world::types::{ProductId, QuestDefinition, QuestRef},
};

/// Delivers every still-missing product of the monthly quest.
///
/// The missing quantities are claimed up front so lower-priority farming does
/// not sell them while the [`FarmPlant`] prerequisites grow the rest.
#[derive(Debug, Clone)]
pub struct BigQuest {
    quest: QuestRef,
    needed: BTreeMap<ProductId, i64>,
}

impl BigQuest {
    pub fn objective(
        ctx: &mut TickContext<'_>,
        priority: Priority,
        definition: &QuestDefinition,
    ) -> Result<Objective, SchedulerError> {
        let holder = ctx.register_holder(priority);
        let needed = definition.missing();

        // Prerequisites only register holders; claims start once all of them exist.
        let prerequisites = needed
            .iter()
            .map(|(product, quantity)| FarmPlant::objective(ctx, priority, *product, *quantity))
            .collect::<Result<Vec<_>, _>>()?;
        if let Err(err) = Self::claim_needed(&holder, ctx, &needed) {
            ctx.ledger.release_all(&holder);
            return Err(err);
        }

        let mut objective = Objective::new(
            holder,
            BigQuest {
                quest: definition.quest,
                needed,
            },
        );
        for prerequisite in prerequisites {
            objective.push_prerequisite(prerequisite);
        }
        Ok(objective)
    }

    fn claim_needed(
        holder: &Holder,
        ctx: &mut TickContext<'_>,
        needed: &BTreeMap<ProductId, i64>,
    ) -> Result<(), SchedulerError> {
        for (product, quantity) in needed {
            ctx.reserve(holder, ResourceKey::Plant(*product), *quantity)?;
        }
        Ok(())
    }

    pub fn needed(&self) -> &BTreeMap<ProductId, i64> {
        &self.needed
    }
}

impl fmt::Display for BigQuest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BigQuest(year={}, quest={})",
            self.quest.year_id, self.quest.quest_id
        )
    }
}

impl Goal for BigQuest {
    fn kind(&self) -> ObjectiveKind {
        ObjectiveKind::BigQuest(self.quest)
    }

    // Reached as soon as every prerequisite has farmed its product.
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
        for (product, quantity) in &self.needed {
            let granted = ctx.reserve(holder, ResourceKey::Plant(*product), *quantity)?;
            if granted < *quantity {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn finish(&mut self, holder: &Holder, ctx: &mut TickContext<'_>) -> Result<(), SchedulerError> {
        for (product, quantity) in &self.needed {
            ctx.world
                .submit_quest_product(self.quest, *product, *quantity)?;
            ctx.free(holder, ResourceKey::Plant(*product));
        }
        tracing::info!(
            target: "objective",
            holder = %holder,
            quest = %self.quest,
            products = self.needed.len(),
            "quest_submitted"
        );
        Ok(())
    }
}
