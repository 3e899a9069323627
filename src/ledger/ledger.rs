use std::collections::BTreeMap;

use crate::{
    ledger::{
        capacity::CapacityProbe,
        types::{
            Holder, HolderId, Priority, Quantity, ReservationRecord, ResourceKey, TickToken,
        },
    },
    objective::error::{SchedulerError, invalid_request, invariant_violation},
};

/// Advisory, priority-ordered bookkeeping of claims on shared resources.
///
/// Nothing here is a lock: every grant is recomputed from the current
/// capacity and the claims of strictly higher-priority holders, so a grant is
/// only good for the tick in which it was computed.
#[derive(Debug, Clone, Default)]
pub struct ReservationLedger {
    next_holder_id: u64,
    generation: u64,
    order_mark: Option<Priority>,
    reservations: BTreeMap<ResourceKey, Vec<ReservationRecord>>,
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_holder(&mut self, priority: Priority) -> Holder {
        self.next_holder_id = self.next_holder_id.saturating_add(1);
        Holder {
            id: HolderId(self.next_holder_id),
            priority,
        }
    }

    /// Starts a new generation; tokens from older generations are rejected.
    pub fn begin_tick(&mut self) -> TickToken {
        self.generation = self.generation.saturating_add(1);
        self.order_mark = None;
        TickToken {
            generation: self.generation,
        }
    }

    pub fn current_tick(&self) -> TickToken {
        TickToken {
            generation: self.generation,
        }
    }

    pub fn reserve<P>(
        &mut self,
        tick: TickToken,
        holder: &Holder,
        key: ResourceKey,
        requested: Quantity,
        probe: &P,
    ) -> Result<i64, SchedulerError>
    where
        P: CapacityProbe + ?Sized,
    {
        if tick.generation != self.generation {
            return Err(invariant_violation(format!(
                "stale tick token: expected generation {}, got {}",
                self.generation, tick.generation
            )));
        }
        if let Quantity::Units(units) = requested
            && units < 0
        {
            return Err(invalid_request(format!(
                "reservation quantity must be non-negative, got {units} for {key}"
            )));
        }

        self.track_order(holder, &key);
        self.upsert(holder, key, requested);
        let granted = self.granted(holder, &key, probe);

        tracing::trace!(
            target: "ledger",
            holder = %holder,
            resource = %key,
            requested = %requested,
            granted = granted,
            "reservation_granted"
        );
        Ok(granted)
    }

    /// Recomputes what `holder` may use of `key` right now without changing the claim.
    pub fn granted<P>(&self, holder: &Holder, key: &ResourceKey, probe: &P) -> i64
    where
        P: CapacityProbe + ?Sized,
    {
        let Some(own) = self.claim(holder, key) else {
            return 0;
        };

        let mut already_reserved = 0i64;
        for record in self.records(key) {
            if record.holder.id == holder.id || !record.holder.outranks(holder) {
                continue;
            }
            match record.quantity {
                Quantity::Unbounded => return 0,
                Quantity::Units(units) => {
                    already_reserved = already_reserved.saturating_add(units);
                }
            }
        }

        let capacity = probe.capacity(key);
        let unreserved = capacity.theoretical.saturating_sub(already_reserved);
        let mut limit = capacity.actual.min(unreserved);
        if let Quantity::Units(requested) = own {
            limit = limit.min(requested);
        }
        limit.max(0)
    }

    pub fn free(&mut self, holder: &Holder, key: &ResourceKey) -> Option<Quantity> {
        let records = self.reservations.get_mut(key)?;
        let index = records
            .iter()
            .position(|record| record.holder.id == holder.id)?;
        let removed = records.remove(index);
        if records.is_empty() {
            self.reservations.remove(key);
        }

        tracing::trace!(
            target: "ledger",
            holder = %holder,
            resource = %key,
            quantity = %removed.quantity,
            "reservation_freed"
        );
        Some(removed.quantity)
    }

    /// Frees every claim of `holder` and returns how many there were.
    pub fn release_all(&mut self, holder: &Holder) -> usize {
        let mut released = 0usize;
        self.reservations.retain(|_, records| {
            let before = records.len();
            records.retain(|record| record.holder.id != holder.id);
            released = released.saturating_add(before - records.len());
            !records.is_empty()
        });
        released
    }

    pub fn claim(&self, holder: &Holder, key: &ResourceKey) -> Option<Quantity> {
        self.records(key)
            .iter()
            .find(|record| record.holder.id == holder.id)
            .map(|record| record.quantity)
    }

    pub fn holdings(&self, holder: &Holder) -> Vec<(ResourceKey, Quantity)> {
        self.reservations
            .iter()
            .flat_map(|(key, records)| {
                records
                    .iter()
                    .filter(|record| record.holder.id == holder.id)
                    .map(|record| (*key, record.quantity))
            })
            .collect()
    }

    pub fn records(&self, key: &ResourceKey) -> &[ReservationRecord] {
        self.reservations
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.reservations.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    /// Writes a claim back verbatim. Used when a scoped override ends.
    pub(crate) fn restore(&mut self, holder: &Holder, key: ResourceKey, quantity: Quantity) {
        self.upsert(holder, key, quantity);
    }

    fn upsert(&mut self, holder: &Holder, key: ResourceKey, quantity: Quantity) {
        let records = self.reservations.entry(key).or_default();
        match records
            .iter_mut()
            .find(|record| record.holder.id == holder.id)
        {
            Some(record) => record.quantity = quantity,
            None => records.push(ReservationRecord {
                holder: *holder,
                quantity,
            }),
        }
    }

    fn track_order(&mut self, holder: &Holder, key: &ResourceKey) {
        match self.order_mark {
            Some(mark) if holder.priority < mark => {
                tracing::warn!(
                    target: "ledger",
                    holder = %holder,
                    resource = %key,
                    generation = self.generation,
                    lowest_priority_seen = mark,
                    "reservation_out_of_priority_order"
                );
            }
            Some(mark) if holder.priority == mark => {}
            _ => self.order_mark = Some(holder.priority),
        }
    }
}
