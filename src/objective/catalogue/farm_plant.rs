use std::fmt;

use crate::{
    ledger::{Holder, Priority, ResourceKey},
    objective::{
        catalogue::provide_plant::ProvidePlant,
        context::TickContext,
        error::{SchedulerError, invalid_request},
        goal::Goal,
        node::Objective,
        types::ObjectiveKind,
    },
    world::types::ProductId,
};

/// Grows `product` until `quantity` units (plus the reserve floor) are in stock.
#[derive(Debug, Clone)]
pub struct FarmPlant {
    product: ProductId,
    quantity: i64,
    respect_floor: bool,
    harvest_quantity: i64,
    footprint_area: i64,
    usable_plant: i64,
    usable_tiles: i64,
}

impl FarmPlant {
    /// Adds a [`ProvidePlant`] prerequisite when none of `product` is owned or growing.
    pub fn objective(
        ctx: &mut TickContext<'_>,
        priority: Priority,
        product: ProductId,
        quantity: i64,
    ) -> Result<Objective, SchedulerError> {
        let info = ctx
            .world
            .product(product)
            .ok_or_else(|| invalid_request(format!("cannot farm unknown {product}")))?;

        let holder = ctx.register_holder(priority);
        let mut objective = Objective::new(
            holder,
            FarmPlant {
                product,
                quantity,
                respect_floor: true,
                harvest_quantity: info.harvest_quantity,
                footprint_area: info.footprint_area(),
                usable_plant: 0,
                usable_tiles: 0,
            },
        );
        if ctx.world.potential_quantity(product) == 0 {
            objective.push_prerequisite(ProvidePlant::objective(ctx, priority, product)?);
        }
        Ok(objective)
    }

    fn reach_quantity(&self, ctx: &TickContext<'_>) -> i64 {
        if self.respect_floor {
            self.quantity + ctx.world.reserve_floor(self.product)
        } else {
            self.quantity
        }
    }
}

impl fmt::Display for FarmPlant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FarmPlant(plant={}, quantity={})", self.product, self.quantity)
    }
}

impl Goal for FarmPlant {
    fn kind(&self) -> ObjectiveKind {
        ObjectiveKind::FarmPlant(self.product)
    }

    fn get_reservations(
        &mut self,
        holder: &Holder,
        ctx: &mut TickContext<'_>,
    ) -> Result<bool, SchedulerError> {
        let reach = self.reach_quantity(ctx);
        self.usable_plant = ctx.reserve(holder, ResourceKey::Plant(self.product), reach)?;
        Ok(self.usable_plant != 0)
    }

    fn is_reached(
        &mut self,
        _holder: &Holder,
        ctx: &mut TickContext<'_>,
    ) -> Result<bool, SchedulerError> {
        Ok(self.usable_plant >= self.reach_quantity(ctx))
    }

    fn finish(&mut self, holder: &Holder, ctx: &mut TickContext<'_>) -> Result<(), SchedulerError> {
        ctx.free(holder, ResourceKey::Plant(self.product));
        ctx.free(holder, ResourceKey::Tile);
        Ok(())
    }

    fn get_work_reservations(
        &mut self,
        holder: &Holder,
        ctx: &mut TickContext<'_>,
    ) -> Result<bool, SchedulerError> {
        if ctx.world.empty_tile_count() == 0 {
            return Ok(false);
        }

        let missing = self.reach_quantity(ctx) - ctx.world.potential_quantity(self.product);
        if missing <= 0 {
            self.usable_tiles = 0;
            return Ok(false);
        }

        // one seed goes back into the ground with every harvest
        let gain_per_crop = (self.harvest_quantity - 1).max(1);
        let crops = ((missing + gain_per_crop - 1) / gain_per_crop).min(self.usable_plant);
        self.usable_tiles =
            ctx.reserve(holder, ResourceKey::Tile, crops * self.footprint_area)?;
        Ok(self.usable_tiles != 0)
    }

    fn work(&mut self, _holder: &Holder, ctx: &mut TickContext<'_>) -> Result<(), SchedulerError> {
        let crops = self.usable_tiles / self.footprint_area;
        if crops > 0 {
            ctx.world.plant(self.product, crops)?;
        }
        Ok(())
    }
}
