use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{
    config::{BotLoopConfig, SchedulerConfig},
    objective::{ObjectiveManager, SchedulerError},
    world::ports::GameWorld,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    pub round: u64,
    pub harvested: i64,
    pub watered: i64,
    pub passes: u32,
    pub completed: usize,
    /// Game time until the next harvest or watering deadline.
    pub sleep_for: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    RoundLimit,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub rounds: u64,
    pub failed_rounds: u64,
    pub stop_reason: StopReason,
}

/// Drives the scheduler against one world: bulk actions around a settled objective pass.
pub struct BotRunner<W> {
    world: W,
    manager: ObjectiveManager,
    loop_config: BotLoopConfig,
    rounds: u64,
}

impl<W: GameWorld> BotRunner<W> {
    pub fn new(world: W, scheduler: SchedulerConfig, loop_config: BotLoopConfig) -> Self {
        Self {
            world,
            manager: ObjectiveManager::new(scheduler),
            loop_config,
            rounds: 0,
        }
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn manager(&self) -> &ObjectiveManager {
        &self.manager
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    #[tracing::instrument(
        name = "bot_round",
        target = "bot",
        skip(self),
        fields(round = self.rounds + 1)
    )]
    pub fn run_round(&mut self) -> Result<RoundReport, SchedulerError> {
        let harvested = self.world.harvest_all()?;
        let settled = self.manager.run_until_settled(&mut self.world)?;
        let watered = self.world.water_all()?;

        let max_sleep = self.loop_config.max_sleep_secs.max(1);
        let sleep_secs = self
            .world
            .seconds_until_next_action()
            .unwrap_or(max_sleep)
            .min(max_sleep);

        self.rounds += 1;
        let report = RoundReport {
            round: self.rounds,
            harvested,
            watered,
            passes: settled.passes,
            completed: settled.completed,
            sleep_for: Duration::from_secs(sleep_secs),
        };
        tracing::info!(
            target: "bot",
            round = report.round,
            harvested = report.harvested,
            watered = report.watered,
            passes = report.passes,
            completed = report.completed,
            active_objectives = self.manager.objectives().len(),
            sleep_secs = sleep_secs,
            "round_completed"
        );
        Ok(report)
    }

    /// Runs rounds until `loop.max_rounds` is reached or `shutdown` fires.
    ///
    /// A failed round is logged and retried on the next one. `advance` moves
    /// the world forward by the game time a round asked to sleep.
    pub async fn run_loop(
        &mut self,
        shutdown: CancellationToken,
        mut advance: impl FnMut(&mut W, Duration),
    ) -> LoopSummary {
        let interval = Duration::from_millis(self.loop_config.round_interval_ms);
        let max_rounds = self.loop_config.max_rounds;
        let mut failed_rounds = 0u64;
        let mut attempted = 0u64;

        let stop_reason = loop {
            if max_rounds.is_some_and(|limit| attempted >= limit) {
                break StopReason::RoundLimit;
            }
            if shutdown.is_cancelled() {
                break StopReason::Shutdown;
            }

            attempted += 1;
            let sleep_for = match self.run_round() {
                Ok(report) => report.sleep_for,
                Err(err) => {
                    failed_rounds += 1;
                    tracing::error!(
                        target: "bot",
                        round = attempted,
                        error_kind = ?err.kind,
                        error = %err,
                        "round_failed"
                    );
                    Duration::from_secs(self.loop_config.max_sleep_secs.max(1))
                }
            };
            advance(&mut self.world, sleep_for);

            tokio::select! {
                _ = shutdown.cancelled() => break StopReason::Shutdown,
                _ = tokio::time::sleep(interval) => {}
            }
        };

        tracing::info!(
            target: "bot",
            rounds = attempted,
            failed_rounds = failed_rounds,
            stop_reason = ?stop_reason,
            "bot_loop_stopped"
        );
        LoopSummary {
            rounds: attempted,
            failed_rounds,
            stop_reason,
        }
    }
}
