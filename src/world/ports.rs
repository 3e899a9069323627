use crate::world::{
    error::ActionError,
    types::{Cents, ProductId, ProductInfo, QuestDefinition, QuestRef, Weed},
};

pub trait StoragePort {
    fn product(&self, product: ProductId) -> Option<ProductInfo>;

    fn stock(&self, product: ProductId) -> i64;

    /// Stock on hand plus what is currently growing.
    fn potential_quantity(&self, product: ProductId) -> i64;

    fn reserve_floor(&self, product: ProductId) -> i64;

    /// Owned plants ordered ascending by potential quantity.
    fn potential_plants(&self) -> Vec<ProductId>;
}

pub trait GardenPort {
    fn empty_tile_count(&self) -> i64;

    fn plantable_capacity(&self) -> i64;

    fn weeds(&self) -> Vec<Weed>;

    fn plant(&mut self, product: ProductId, count: i64) -> Result<i64, ActionError>;

    fn remove_weed(&mut self, weed: &Weed) -> Result<(), ActionError>;

    fn harvest_all(&mut self) -> Result<i64, ActionError>;

    fn water_all(&mut self) -> Result<i64, ActionError>;

    /// Seconds until the next harvest or watering deadline, if anything grows.
    fn seconds_until_next_action(&self) -> Option<u64>;
}

pub trait MarketPort {
    fn ranked_by_profitability(&self) -> Vec<ProductId>;

    fn sell_price(&self, product: ProductId) -> Option<Cents>;

    fn min_sell_quantity(&self) -> i64;

    fn protected_money_floor(&self) -> Cents;

    fn sell(&mut self, product: ProductId, quantity: i64, price: Cents) -> Result<(), ActionError>;

    fn buy_cheapest(
        &mut self,
        product: ProductId,
        quantity: i64,
        budget: Cents,
    ) -> Result<i64, ActionError>;
}

pub trait AccountPort {
    fn money(&self) -> Cents;
}

pub trait QuestPort {
    fn active_quest(&self) -> Option<QuestDefinition>;

    fn submit_quest_product(
        &mut self,
        quest: QuestRef,
        product: ProductId,
        quantity: i64,
    ) -> Result<(), ActionError>;
}

/// Everything the scheduler reads from and acts on.
pub trait GameWorld: StoragePort + GardenPort + MarketPort + AccountPort + QuestPort {}

impl<T> GameWorld for T where T: StoragePort + GardenPort + MarketPort + AccountPort + QuestPort {}
