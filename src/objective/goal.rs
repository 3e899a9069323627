use std::fmt;

use crate::{
    ledger::Holder,
    objective::{context::TickContext, error::SchedulerError, types::ObjectiveKind},
};

/// Life cycle hooks of one goal, driven by [`crate::objective::Objective`].
///
/// The reservation hooks report whether the allocation they obtained is
/// enough to proceed. They default to `true`, `work` and `finish` default to
/// doing nothing; only `is_reached` must be provided.
pub trait Goal: fmt::Display + Send {
    fn kind(&self) -> ObjectiveKind;

    fn get_reservations(
        &mut self,
        _holder: &Holder,
        _ctx: &mut TickContext<'_>,
    ) -> Result<bool, SchedulerError> {
        Ok(true)
    }

    fn is_reached(
        &mut self,
        holder: &Holder,
        ctx: &mut TickContext<'_>,
    ) -> Result<bool, SchedulerError>;

    fn get_finish_reservations(
        &mut self,
        _holder: &Holder,
        _ctx: &mut TickContext<'_>,
    ) -> Result<bool, SchedulerError> {
        Ok(true)
    }

    /// One-shot terminal action. Completion is reported by the node once this returns `Ok`.
    fn finish(&mut self, _holder: &Holder, _ctx: &mut TickContext<'_>) -> Result<(), SchedulerError> {
        Ok(())
    }

    fn get_work_reservations(
        &mut self,
        _holder: &Holder,
        _ctx: &mut TickContext<'_>,
    ) -> Result<bool, SchedulerError> {
        Ok(true)
    }

    fn work(&mut self, _holder: &Holder, _ctx: &mut TickContext<'_>) -> Result<(), SchedulerError> {
        Ok(())
    }
}
