use std::fmt;

use crate::{
    ledger::{Holder, Priority, Quantity, ResourceKey},
    objective::{
        catalogue::selling::sell_surplus,
        context::TickContext,
        error::{SchedulerError, internal_error},
        goal::Goal,
        node::Objective,
        types::ObjectiveKind,
    },
    world::types::{Cents, ProductId},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct UsableQuantities {
    plant: i64,
    prev_plant: i64,
    fallback: i64,
    prev_fallback: i64,
    tiles: i64,
}

/// Plants and sells the most profitable products until `amount` is on the account.
#[derive(Debug, Clone)]
pub struct FarmMoney {
    amount: Option<Cents>,
    respect_floor: bool,
    plant: Option<ProductId>,
    prev_plant: Option<ProductId>,
    fallback: Option<ProductId>,
    prev_fallback: Option<ProductId>,
    usable: UsableQuantities,
}

impl FarmMoney {
    /// `amount = None` farms forever.
    pub fn new(amount: Option<Cents>, respect_floor: bool) -> Self {
        Self {
            amount,
            respect_floor,
            plant: None,
            prev_plant: None,
            fallback: None,
            prev_fallback: None,
            usable: UsableQuantities::default(),
        }
    }

    pub fn objective(
        ctx: &mut TickContext<'_>,
        priority: Priority,
        amount: Option<Cents>,
        respect_floor: bool,
    ) -> Objective {
        let holder = ctx.register_holder(priority);
        Objective::new(holder, Self::new(amount, respect_floor))
    }

    pub fn plant(&self) -> Option<ProductId> {
        self.plant
    }

    pub fn fallback(&self) -> Option<ProductId> {
        self.fallback
    }

    pub fn previous_plant(&self) -> Option<ProductId> {
        self.prev_plant
    }

    pub fn previous_fallback(&self) -> Option<ProductId> {
        self.prev_fallback
    }

    /// Moves `current` to `previous` when `next` replaces it, freeing whatever was previous before.
    fn rotate(
        holder: &Holder,
        ctx: &mut TickContext<'_>,
        current: &mut Option<ProductId>,
        previous: &mut Option<ProductId>,
        next: ProductId,
    ) {
        match *current {
            None => *current = Some(next),
            Some(active) if active == next => {}
            Some(active) => {
                if let Some(stale) = previous.take() {
                    ctx.free(holder, ResourceKey::Plant(stale));
                }
                *previous = Some(active);
                *current = Some(next);
            }
        }
    }

    fn reserve_all(
        holder: &Holder,
        ctx: &mut TickContext<'_>,
        product: Option<ProductId>,
    ) -> Result<i64, SchedulerError> {
        match product {
            Some(product) => ctx.reserve(holder, ResourceKey::Plant(product), Quantity::Unbounded),
            None => Ok(0),
        }
    }

    fn select_products(&mut self, holder: &Holder, ctx: &mut TickContext<'_>) -> Option<ProductId> {
        let ranked = ctx.world.ranked_by_profitability();
        let (&most_profitable, others) = ranked.split_first()?;
        Self::rotate(
            holder,
            ctx,
            &mut self.plant,
            &mut self.prev_plant,
            most_profitable,
        );
        if self.fallback == Some(most_profitable) {
            self.fallback = None;
        }

        let eligible = others.iter().copied().find(|product| {
            ctx.world.potential_quantity(*product) >= ctx.world.reserve_floor(*product)
        });
        match eligible {
            Some(product) => Self::rotate(
                holder,
                ctx,
                &mut self.fallback,
                &mut self.prev_fallback,
                product,
            ),
            None if self.fallback.is_none() => {
                self.fallback = ctx
                    .world
                    .potential_plants()
                    .into_iter()
                    .rev()
                    .find(|product| *product != most_profitable);
            }
            None => {}
        }
        self.drop_shadowed_previous();
        Some(most_profitable)
    }

    /// Clears previous slots that name an active product. The claim is keyed
    /// by product, so it stays with the active slot.
    fn drop_shadowed_previous(&mut self) {
        let active = [self.plant, self.fallback];
        if self.prev_plant.is_some() && active.contains(&self.prev_plant) {
            self.prev_plant = None;
        }
        if self.prev_fallback.is_some()
            && (active.contains(&self.prev_fallback) || self.prev_fallback == self.prev_plant)
        {
            self.prev_fallback = None;
        }
    }

    fn buy_seeds(
        &self,
        holder: &Holder,
        ctx: &mut TickContext<'_>,
        product: ProductId,
    ) -> Result<(), SchedulerError> {
        let empty_tiles = ctx.world.empty_tile_count();
        let stock = ctx.world.stock(product);
        if stock >= empty_tiles {
            return Ok(());
        }

        let buy_quantity = empty_tiles - stock;
        let half_floor = ctx.world.protected_money_floor() / 2;
        let top_up_quantity = ctx.config.seed_top_up_quantity;
        let bought = ctx.with_scoped(
            holder,
            ResourceKey::Money,
            Quantity::Unbounded,
            |granted, world| {
                if granted > 0 {
                    return Ok(world.buy_cheapest(product, buy_quantity, granted + half_floor)?);
                }
                if top_up_quantity <= 0 {
                    return Ok(0);
                }
                let cash = world.money() / 2;
                Ok(world.buy_cheapest(product, top_up_quantity, cash)?)
            },
        )?;

        tracing::debug!(
            target: "objective",
            holder = %holder,
            product = %product,
            wanted = buy_quantity,
            bought = bought,
            "seeds_bought"
        );
        Ok(())
    }

    fn retire_if_exhausted(
        holder: &Holder,
        ctx: &mut TickContext<'_>,
        slot: &mut Option<ProductId>,
    ) {
        let Some(product) = *slot else {
            return;
        };
        let keep_back = ctx.world.reserve_floor(product) + ctx.world.min_sell_quantity();
        if keep_back > ctx.world.potential_quantity(product) {
            ctx.free(holder, ResourceKey::Plant(product));
            *slot = None;
        }
    }
}

impl fmt::Display for FarmMoney {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.amount {
            Some(amount) => write!(f, "FarmMoney(amount={amount})"),
            None => write!(f, "FarmMoney(amount=unbounded)"),
        }
    }
}

impl Goal for FarmMoney {
    fn kind(&self) -> ObjectiveKind {
        ObjectiveKind::FarmMoney
    }

    fn is_reached(
        &mut self,
        _holder: &Holder,
        ctx: &mut TickContext<'_>,
    ) -> Result<bool, SchedulerError> {
        let Some(amount) = self.amount else {
            return Ok(false);
        };
        let target = if self.respect_floor {
            amount + ctx.world.protected_money_floor()
        } else {
            amount
        };
        Ok(ctx.world.money() >= target)
    }

    fn finish(&mut self, holder: &Holder, ctx: &mut TickContext<'_>) -> Result<(), SchedulerError> {
        for product in [self.plant, self.prev_plant, self.fallback, self.prev_fallback]
            .into_iter()
            .flatten()
        {
            ctx.free(holder, ResourceKey::Plant(product));
        }
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
        let Some(plant) = self.select_products(holder, ctx) else {
            return Ok(false);
        };

        self.buy_seeds(holder, ctx, plant)?;

        self.usable = UsableQuantities {
            plant: Self::reserve_all(holder, ctx, self.plant)?,
            prev_plant: Self::reserve_all(holder, ctx, self.prev_plant)?,
            fallback: Self::reserve_all(holder, ctx, self.fallback)?,
            prev_fallback: Self::reserve_all(holder, ctx, self.prev_fallback)?,
            tiles: 0,
        };
        if self.usable.plant == 0 && self.usable.fallback == 0 {
            return Ok(false);
        }

        self.usable.tiles = ctx.reserve(
            holder,
            ResourceKey::Tile,
            self.usable.plant + self.usable.fallback,
        )?;
        Ok(self.usable.tiles != 0)
    }

    fn work(&mut self, holder: &Holder, ctx: &mut TickContext<'_>) -> Result<(), SchedulerError> {
        let usable = self.usable;
        let mut tiles_left = usable.tiles;

        let Some(plant) = self.plant else {
            return Err(internal_error(format!(
                "{self} is working without a selected product"
            )));
        };
        let area = ctx
            .world
            .product(plant)
            .map(|info| info.footprint_area())
            .unwrap_or(1);
        let planted = ctx
            .world
            .plant(plant, (tiles_left / area).min(usable.plant))?;
        tiles_left -= planted * area;

        let surplus = usable.plant - ctx.world.plantable_capacity();
        if surplus > 0 {
            sell_surplus(ctx.world, plant, Some(surplus))?;
        }

        let mut planted_fallback = 0;
        if let Some(fallback) = self.fallback {
            let area = ctx
                .world
                .product(fallback)
                .map(|info| info.footprint_area())
                .unwrap_or(1);
            planted_fallback = ctx
                .world
                .plant(fallback, (tiles_left / area).min(usable.fallback))?;

            let surplus = usable.fallback - planted_fallback;
            if surplus > 0 {
                sell_surplus(ctx.world, fallback, Some(surplus))?;
            }
        }
        if let Some(prev_plant) = self.prev_plant {
            sell_surplus(ctx.world, prev_plant, Some(usable.prev_plant))?;
        }
        if let Some(prev_fallback) = self.prev_fallback {
            sell_surplus(ctx.world, prev_fallback, Some(usable.prev_fallback))?;
        }

        Self::retire_if_exhausted(holder, ctx, &mut self.prev_plant);
        Self::retire_if_exhausted(holder, ctx, &mut self.prev_fallback);

        tracing::debug!(
            target: "objective",
            holder = %holder,
            tiles_granted = usable.tiles,
            planted = planted,
            tiles_left = tiles_left,
            planted_fallback = planted_fallback,
            "farm_money_worked"
        );
        Ok(())
    }
}
