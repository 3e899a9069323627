pub mod capacity;
pub mod ledger;
pub mod scoped;
pub mod types;

pub use capacity::CapacityProbe;
pub use ledger::ReservationLedger;
pub use scoped::ScopedReservation;
pub use types::{
    Capacity, Holder, HolderId, Priority, Quantity, ReservationRecord, ResourceKey, ResourceKind,
    TickToken,
};
