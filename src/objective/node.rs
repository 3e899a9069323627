use std::fmt;

use crate::{
    ledger::{Holder, Priority},
    objective::{context::TickContext, error::SchedulerError, goal::Goal, types::ObjectiveKind},
};

/// A goal bound to a ledger holder, together with the prerequisites it owns.
pub struct Objective {
    holder: Holder,
    goal: Box<dyn Goal>,
    prerequisites: Vec<Objective>,
    finish_attempts: u32,
}

impl Objective {
    pub fn new(holder: Holder, goal: impl Goal + 'static) -> Self {
        Self::from_boxed(holder, Box::new(goal))
    }

    pub fn from_boxed(holder: Holder, goal: Box<dyn Goal>) -> Self {
        Self {
            holder,
            goal,
            prerequisites: Vec::new(),
            finish_attempts: 0,
        }
    }

    pub fn with_prerequisite(mut self, prerequisite: Objective) -> Self {
        self.prerequisites.push(prerequisite);
        self
    }

    pub fn push_prerequisite(&mut self, prerequisite: Objective) {
        self.prerequisites.push(prerequisite);
    }

    pub fn holder(&self) -> &Holder {
        &self.holder
    }

    pub fn priority(&self) -> Priority {
        self.holder.priority
    }

    pub fn kind(&self) -> ObjectiveKind {
        self.goal.kind()
    }

    pub fn prerequisites(&self) -> &[Objective] {
        &self.prerequisites
    }

    pub fn finish_attempts(&self) -> u32 {
        self.finish_attempts
    }

    /// Advances the objective by at most one step and reports whether it completed.
    ///
    /// Prerequisites are stepped first and dropped once complete; while any is
    /// left, neither `work` nor `finish` of this goal runs. Errors from hooks
    /// leave the objective untouched so the next pass retries it.
    pub fn work_if_possible(&mut self, ctx: &mut TickContext<'_>) -> Result<bool, SchedulerError> {
        tracing::debug!(
            target: "objective",
            objective = %self,
            holder = %self.holder,
            prerequisites = self.prerequisites.len(),
            generation = ctx.tick.generation,
            "objective_step"
        );

        if !self.prerequisites.is_empty() {
            let mut index = 0;
            while index < self.prerequisites.len() {
                if self.prerequisites[index].work_if_possible(ctx)? {
                    self.prerequisites.remove(index);
                } else {
                    index += 1;
                }
            }
            if !self.prerequisites.is_empty() {
                return Ok(false);
            }
        }

        if !self.goal.get_reservations(&self.holder, ctx)? {
            return Ok(false);
        }

        if self.goal.is_reached(&self.holder, ctx)? && self.try_finish(ctx)? {
            return Ok(true);
        }

        if !self.goal.get_work_reservations(&self.holder, ctx)? {
            return Ok(false);
        }
        self.goal.work(&self.holder, ctx)?;

        if self.goal.is_reached(&self.holder, ctx)? && self.try_finish(ctx)? {
            return Ok(true);
        }
        Ok(false)
    }

    fn try_finish(&mut self, ctx: &mut TickContext<'_>) -> Result<bool, SchedulerError> {
        if !self.goal.get_finish_reservations(&self.holder, ctx)? {
            return Ok(false);
        }

        if self.finish_attempts > 0 {
            tracing::warn!(
                target: "objective",
                objective = %self,
                holder = %self.holder,
                attempts = self.finish_attempts,
                "finish_reentered"
            );
        }
        self.finish_attempts = self.finish_attempts.saturating_add(1);
        self.goal.finish(&self.holder, ctx)?;

        let leftover = ctx.ledger.holdings(&self.holder);
        if !leftover.is_empty() {
            tracing::warn!(
                target: "objective",
                objective = %self,
                holder = %self.holder,
                leftover = ?leftover,
                "objective_completed_with_live_reservations"
            );
            ctx.ledger.release_all(&self.holder);
        }

        tracing::debug!(
            target: "objective",
            objective = %self,
            holder = %self.holder,
            "objective_completed"
        );
        Ok(true)
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(priority={})", self.goal, self.holder.priority)
    }
}

impl fmt::Debug for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Objective")
            .field("holder", &self.holder)
            .field("goal", &self.goal.to_string())
            .field("prerequisites", &self.prerequisites)
            .field("finish_attempts", &self.finish_attempts)
            .finish()
    }
}
