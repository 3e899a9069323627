use crate::{
    ledger::types::{Capacity, ResourceKey},
    world::ports::GameWorld,
};

/// Source of truth for how much of a resource exists at query time.
pub trait CapacityProbe {
    fn capacity(&self, key: &ResourceKey) -> Capacity;
}

impl<W> CapacityProbe for W
where
    W: GameWorld + ?Sized,
{
    fn capacity(&self, key: &ResourceKey) -> Capacity {
        match key {
            ResourceKey::Plant(product) => Capacity {
                theoretical: self.potential_quantity(*product),
                actual: self.stock(*product),
            },
            ResourceKey::Tile => Capacity {
                theoretical: self.plantable_capacity(),
                actual: self.empty_tile_count(),
            },
            ResourceKey::Money => {
                let spendable = self.money() - self.protected_money_floor();
                Capacity {
                    theoretical: spendable,
                    actual: spendable,
                }
            }
        }
    }
}
