use crate::{
    config::SchedulerConfig,
    ledger::ReservationLedger,
    objective::{
        catalogue::{BigQuest, FarmMoneyMain, RemoveWeed},
        context::TickContext,
        error::SchedulerError,
        node::Objective,
        types::ObjectiveKind,
    },
    world::ports::GameWorld,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettleReport {
    pub passes: u32,
    pub completed: usize,
}

/// Owns the active objectives and the ledger they reserve against.
#[derive(Debug)]
pub struct ObjectiveManager {
    config: SchedulerConfig,
    ledger: ReservationLedger,
    objectives: Vec<Objective>,
}

impl ObjectiveManager {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            ledger: ReservationLedger::new(),
            objectives: Vec::new(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &ReservationLedger {
        &self.ledger
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// Builds an objective against this manager's ledger and adds it to the active set.
    pub fn spawn_objective<F>(
        &mut self,
        world: &mut dyn GameWorld,
        build: F,
    ) -> Result<(), SchedulerError>
    where
        F: FnOnce(&mut TickContext<'_>) -> Result<Objective, SchedulerError>,
    {
        let mut ctx = TickContext::begin(&mut self.ledger, world, &self.config);
        let objective = build(&mut ctx)?;
        self.objectives.push(objective);
        Ok(())
    }

    fn has_objective(&self, predicate: impl Fn(ObjectiveKind) -> bool) -> bool {
        self.objectives
            .iter()
            .any(|objective| predicate(objective.kind()))
    }

    /// Adds the ever-present goal and one objective per newly discovered opportunity.
    ///
    /// A quest whose objective cannot be built is logged and skipped so the
    /// other discoveries of the pass still land.
    pub fn create_objectives(&mut self, world: &mut dyn GameWorld) -> Result<usize, SchedulerError> {
        let needs_farm_money =
            !self.has_objective(|kind| matches!(kind, ObjectiveKind::FarmMoneyMain));
        let needs_weed_removal =
            !self.has_objective(|kind| matches!(kind, ObjectiveKind::RemoveWeed(_)));
        let open_quest = world.active_quest().filter(|quest| {
            !quest.done
                && !quest.missing().is_empty()
                && !self.has_objective(|kind| kind == ObjectiveKind::BigQuest(quest.quest))
        });

        let priorities = self.config.priorities;
        let mut created = Vec::new();
        {
            let mut ctx = TickContext::begin(&mut self.ledger, world, &self.config);

            if needs_farm_money {
                created.push(FarmMoneyMain::objective(&mut ctx, priorities.farm_money));
            }

            if needs_weed_removal
                && let Some(weed) = ctx
                    .world
                    .weeds()
                    .into_iter()
                    .min_by_key(|weed| (weed.remove_cost, weed.id))
            {
                created.push(RemoveWeed::objective(&mut ctx, priorities.remove_weed, weed));
            }

            if let Some(quest) = open_quest {
                match BigQuest::objective(&mut ctx, priorities.big_quest, &quest) {
                    Ok(objective) => created.push(objective),
                    Err(err) => tracing::warn!(
                        target: "objective",
                        quest = %quest.quest,
                        error_kind = ?err.kind,
                        error = %err,
                        "objective_creation_failed"
                    ),
                }
            }
        }

        for objective in &created {
            tracing::info!(
                target: "objective",
                objective = %objective,
                holder = %objective.holder(),
                "objective_created"
            );
        }
        let count = created.len();
        self.objectives.extend(created);
        Ok(count)
    }

    /// Steps every active objective once, in ascending priority order.
    ///
    /// Returns whether any objective completed. An error aborts the pass and
    /// leaves the failing objective in place for the next one.
    pub fn run_objectives(&mut self, world: &mut dyn GameWorld) -> Result<bool, SchedulerError> {
        Ok(self.run_pass(world)? > 0)
    }

    fn run_pass(&mut self, world: &mut dyn GameWorld) -> Result<usize, SchedulerError> {
        self.objectives.sort_by_key(Objective::priority);
        let mut ctx = TickContext::begin(&mut self.ledger, world, &self.config);

        let mut completed = 0usize;
        let mut index = 0;
        while index < self.objectives.len() {
            if self.objectives[index].work_if_possible(&mut ctx)? {
                let objective = self.objectives.remove(index);
                tracing::info!(
                    target: "objective",
                    objective = %objective,
                    holder = %objective.holder(),
                    finish_attempts = objective.finish_attempts(),
                    "objective_retired"
                );
                completed += 1;
            } else {
                index += 1;
            }
        }
        Ok(completed)
    }

    /// Repeats create + run until a pass completes nothing.
    pub fn run_until_settled(
        &mut self,
        world: &mut dyn GameWorld,
    ) -> Result<SettleReport, SchedulerError> {
        let max_passes = self.config.max_passes_per_round.max(1);
        let mut report = SettleReport::default();

        loop {
            self.create_objectives(world)?;
            let completed = self.run_pass(world)?;
            report.passes += 1;
            report.completed += completed;

            if completed == 0 {
                break;
            }
            if report.passes >= max_passes {
                tracing::warn!(
                    target: "objective",
                    passes = report.passes,
                    completed = report.completed,
                    "settle_pass_limit_reached"
                );
                break;
            }
        }

        tracing::debug!(
            target: "objective",
            passes = report.passes,
            completed = report.completed,
            active = self.objectives.len(),
            reservations = self.ledger.len(),
            "objectives_settled"
        );
        Ok(report)
    }
}
