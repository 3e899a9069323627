use crate::{
    config::SchedulerConfig,
    ledger::{Holder, Priority, Quantity, ReservationLedger, ResourceKey, ScopedReservation, TickToken},
    objective::error::SchedulerError,
    world::ports::GameWorld,
};

/// Everything an objective may touch during one scheduling pass.
pub struct TickContext<'a> {
    pub tick: TickToken,
    pub ledger: &'a mut ReservationLedger,
    pub world: &'a mut dyn GameWorld,
    pub config: &'a SchedulerConfig,
}

impl<'a> TickContext<'a> {
    /// Opens a new ledger generation for this pass.
    pub fn begin(
        ledger: &'a mut ReservationLedger,
        world: &'a mut dyn GameWorld,
        config: &'a SchedulerConfig,
    ) -> Self {
        let tick = ledger.begin_tick();
        Self {
            tick,
            ledger,
            world,
            config,
        }
    }

    pub fn register_holder(&mut self, priority: Priority) -> Holder {
        self.ledger.register_holder(priority)
    }

    pub fn reserve(
        &mut self,
        holder: &Holder,
        key: ResourceKey,
        requested: impl Into<Quantity>,
    ) -> Result<i64, SchedulerError> {
        self.ledger
            .reserve(self.tick, holder, key, requested.into(), &*self.world)
    }

    pub fn free(&mut self, holder: &Holder, key: ResourceKey) -> Option<Quantity> {
        self.ledger.free(holder, &key)
    }

    /// Runs `f` while `holder` temporarily claims `requested` of `key`.
    ///
    /// `f` receives the granted amount and the world; the previous claim is
    /// restored afterwards whether `f` succeeds, fails or panics.
    pub fn with_scoped<T>(
        &mut self,
        holder: &Holder,
        key: ResourceKey,
        requested: impl Into<Quantity>,
        f: impl FnOnce(i64, &mut dyn GameWorld) -> Result<T, SchedulerError>,
    ) -> Result<T, SchedulerError> {
        let scope = ScopedReservation::acquire(
            &mut *self.ledger,
            self.tick,
            holder,
            key,
            requested.into(),
            &*self.world,
        )?;
        let result = f(scope.granted(), &mut *self.world);
        drop(scope);
        result
    }
}
