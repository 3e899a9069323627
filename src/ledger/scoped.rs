use crate::{
    ledger::{
        capacity::CapacityProbe,
        ledger::ReservationLedger,
        types::{Holder, Quantity, ResourceKey, TickToken},
    },
    objective::error::SchedulerError,
};

/// Temporarily overrides a holder's claim.
///
/// Dropping the guard writes back the claim that existed before `acquire`,
/// or frees the entry if there was none. This runs on every exit path,
/// including `?` returns and unwinding.
#[derive(Debug)]
pub struct ScopedReservation<'a> {
    ledger: &'a mut ReservationLedger,
    holder: Holder,
    key: ResourceKey,
    previous: Option<Quantity>,
    granted: i64,
}

impl<'a> ScopedReservation<'a> {
    pub fn acquire<P>(
        ledger: &'a mut ReservationLedger,
        tick: TickToken,
        holder: &Holder,
        key: ResourceKey,
        requested: Quantity,
        probe: &P,
    ) -> Result<Self, SchedulerError>
    where
        P: CapacityProbe + ?Sized,
    {
        let previous = ledger.claim(holder, &key);
        let granted = ledger.reserve(tick, holder, key, requested, probe)?;
        Ok(Self {
            ledger,
            holder: *holder,
            key,
            previous,
            granted,
        })
    }

    pub fn granted(&self) -> i64 {
        self.granted
    }

    pub fn previous(&self) -> Option<Quantity> {
        self.previous
    }
}

impl Drop for ScopedReservation<'_> {
    fn drop(&mut self) {
        match self.previous {
            Some(quantity) => self.ledger.restore(&self.holder, self.key, quantity),
            None => {
                self.ledger.free(&self.holder, &self.key);
            }
        }
    }
}
