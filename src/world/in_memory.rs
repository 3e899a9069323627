use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::world::{
    error::ActionError,
    ports::{AccountPort, GardenPort, MarketPort, QuestPort, StoragePort},
    types::{
        Cents, ProductId, ProductInfo, QuestDefinition, QuestRef, Timestamp, Weed,
        reserve_floor_for,
    },
};

const SECONDS_PER_DAY: f64 = 86_400.0;
const MARKET_FEE_PERCENT: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowingCrop {
    pub product: ProductId,
    pub ready_at: Timestamp,
    #[serde(default)]
    pub watered: bool,
}

/// Serializable state of a farm, as loaded from the `farm` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    #[serde(default)]
    pub now: Timestamp,
    pub money: Cents,
    pub plantable_tiles: i64,
    pub products: Vec<ProductInfo>,
    #[serde(default)]
    pub stock: BTreeMap<ProductId, i64>,
    #[serde(default)]
    pub crops: Vec<GrowingCrop>,
    #[serde(default)]
    pub weeds: Vec<Weed>,
    #[serde(default)]
    pub quest: Option<QuestDefinition>,
    /// Cheapest marketplace offer per product; the NPC price applies otherwise.
    #[serde(default)]
    pub market_offers: BTreeMap<ProductId, Cents>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FarmAction {
    Plant {
        product: ProductId,
        count: i64,
    },
    Sell {
        product: ProductId,
        quantity: i64,
        price: Cents,
    },
    Buy {
        product: ProductId,
        quantity: i64,
        spent: Cents,
    },
    RemoveWeed {
        weed: Weed,
    },
    SubmitQuestProduct {
        quest: QuestRef,
        product: ProductId,
        quantity: i64,
    },
    Harvest {
        crops: i64,
    },
    Water {
        crops: i64,
    },
}

#[derive(Debug, Clone)]
struct ScriptedFailure {
    action: &'static str,
    reason: String,
}

/// A self-contained farm that applies every action to its own state.
#[derive(Debug, Clone)]
pub struct InMemoryFarm {
    now: Timestamp,
    money: Cents,
    plantable_tiles: i64,
    products: BTreeMap<ProductId, ProductInfo>,
    stock: BTreeMap<ProductId, i64>,
    crops: Vec<GrowingCrop>,
    weeds: Vec<Weed>,
    quest: Option<QuestDefinition>,
    market_offers: BTreeMap<ProductId, Cents>,
    pending_failure: Option<ScriptedFailure>,
    actions: Vec<FarmAction>,
}

impl InMemoryFarm {
    pub fn from_snapshot(snapshot: FarmSnapshot) -> Self {
        Self {
            now: snapshot.now,
            money: snapshot.money,
            plantable_tiles: snapshot.plantable_tiles,
            products: snapshot
                .products
                .into_iter()
                .map(|product| (product.id, product))
                .collect(),
            stock: snapshot.stock,
            crops: snapshot.crops,
            weeds: snapshot.weeds,
            quest: snapshot.quest,
            market_offers: snapshot.market_offers,
            pending_failure: None,
            actions: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> FarmSnapshot {
        FarmSnapshot {
            now: self.now,
            money: self.money,
            plantable_tiles: self.plantable_tiles,
            products: self.products.values().cloned().collect(),
            stock: self.stock.clone(),
            crops: self.crops.clone(),
            weeds: self.weeds.clone(),
            quest: self.quest.clone(),
            market_offers: self.market_offers.clone(),
        }
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn advance(&mut self, secs: u64) {
        self.now = self.now.saturating_add(secs);
    }

    pub fn actions(&self) -> &[FarmAction] {
        &self.actions
    }

    pub fn crops(&self) -> &[GrowingCrop] {
        &self.crops
    }

    pub fn quest(&self) -> Option<&QuestDefinition> {
        self.quest.as_ref()
    }

    pub fn set_stock(&mut self, product: ProductId, quantity: i64) {
        self.stock.insert(product, quantity.max(0));
    }

    /// Makes the next call of `action` fail with `reason`.
    pub fn fail_next(&mut self, action: &'static str, reason: impl Into<String>) {
        self.pending_failure = Some(ScriptedFailure {
            action,
            reason: reason.into(),
        });
    }

    fn take_failure(&mut self, action: &'static str) -> Result<(), ActionError> {
        if self
            .pending_failure
            .as_ref()
            .is_some_and(|failure| failure.action == action)
            && let Some(failure) = self.pending_failure.take()
        {
            return Err(ActionError::Rejected {
                action,
                reason: failure.reason,
            });
        }
        Ok(())
    }

    fn info(&self, product: ProductId) -> Result<&ProductInfo, ActionError> {
        self.products
            .get(&product)
            .ok_or(ActionError::UnknownProduct(product))
    }

    fn area_of(&self, product: ProductId) -> i64 {
        self.products
            .get(&product)
            .map(ProductInfo::footprint_area)
            .unwrap_or(1)
    }

    fn occupied_tiles(&self) -> i64 {
        self.crops
            .iter()
            .map(|crop| self.area_of(crop.product))
            .sum()
    }

    fn growing_count(&self, product: ProductId) -> i64 {
        self.crops
            .iter()
            .filter(|crop| crop.product == product)
            .count() as i64
    }

    fn buy_price(&self, info: &ProductInfo) -> Cents {
        match self.market_offers.get(&info.id) {
            Some(offer) if *offer < info.npc_price => *offer,
            _ => info.npc_price,
        }
    }

    fn relative_win(&self, info: &ProductInfo) -> f64 {
        let Some(price) = self.sell_price(info.id) else {
            return f64::MIN;
        };
        let grow_secs = info.grow_secs.max(1) as f64;
        (price as f64 * 0.9 * SECONDS_PER_DAY * (info.harvest_quantity - 1) as f64)
            / (grow_secs * info.footprint_area() as f64)
    }

    fn most_profitable(&self) -> Option<&ProductInfo> {
        self.ranked_by_profitability()
            .first()
            .and_then(|product| self.products.get(product))
    }
}

impl StoragePort for InMemoryFarm {
    fn product(&self, product: ProductId) -> Option<ProductInfo> {
        self.products.get(&product).cloned()
    }

    fn stock(&self, product: ProductId) -> i64 {
        self.stock.get(&product).copied().unwrap_or(0)
    }

    fn potential_quantity(&self, product: ProductId) -> i64 {
        let harvest_quantity = self
            .products
            .get(&product)
            .map(|info| info.harvest_quantity)
            .unwrap_or(0);
        self.stock(product) + self.growing_count(product) * harvest_quantity
    }

    fn reserve_floor(&self, product: ProductId) -> i64 {
        reserve_floor_for(self.plantable_tiles, self.area_of(product))
    }

    fn potential_plants(&self) -> Vec<ProductId> {
        let mut owned: Vec<(i64, ProductId)> = self
            .products
            .keys()
            .map(|product| (self.potential_quantity(*product), *product))
            .filter(|(potential, _)| *potential > 0)
            .collect();
        owned.sort();
        owned.into_iter().map(|(_, product)| product).collect()
    }
}

impl GardenPort for InMemoryFarm {
    fn empty_tile_count(&self) -> i64 {
        (self.plantable_tiles - self.occupied_tiles()).max(0)
    }

    fn plantable_capacity(&self) -> i64 {
        self.plantable_tiles
    }

    fn weeds(&self) -> Vec<Weed> {
        self.weeds.clone()
    }

    fn plant(&mut self, product: ProductId, count: i64) -> Result<i64, ActionError> {
        self.take_failure("plant")?;
        let info = self.info(product)?.clone();
        if count <= 0 {
            return Ok(0);
        }

        let fits = self.empty_tile_count() / info.footprint_area();
        let planted = count.min(self.stock(product)).min(fits).max(0);
        for _ in 0..planted {
            self.crops.push(GrowingCrop {
                product,
                ready_at: self.now.saturating_add(info.grow_secs),
                watered: false,
            });
        }
        *self.stock.entry(product).or_insert(0) -= planted;

        self.actions.push(FarmAction::Plant {
            product,
            count: planted,
        });
        Ok(planted)
    }

    fn remove_weed(&mut self, weed: &Weed) -> Result<(), ActionError> {
        self.take_failure("remove_weed")?;
        let index = self
            .weeds
            .iter()
            .position(|candidate| candidate.id == weed.id)
            .ok_or(ActionError::UnknownWeed(weed.id))?;
        if self.money < weed.remove_cost {
            return Err(ActionError::Insufficient {
                what: "money",
                required: weed.remove_cost,
                available: self.money,
            });
        }

        let removed = self.weeds.remove(index);
        self.money -= removed.remove_cost;
        self.plantable_tiles += removed.tiles;
        self.actions.push(FarmAction::RemoveWeed { weed: removed });
        Ok(())
    }

    fn harvest_all(&mut self) -> Result<i64, ActionError> {
        self.take_failure("harvest_all")?;
        let now = self.now;
        let (ready, growing): (Vec<GrowingCrop>, Vec<GrowingCrop>) = self
            .crops
            .drain(..)
            .partition(|crop| crop.ready_at <= now);
        self.crops = growing;

        for crop in &ready {
            let harvest_quantity = self
                .products
                .get(&crop.product)
                .map(|info| info.harvest_quantity)
                .unwrap_or(0);
            *self.stock.entry(crop.product).or_insert(0) += harvest_quantity;
        }

        let crops = ready.len() as i64;
        if crops > 0 {
            self.actions.push(FarmAction::Harvest { crops });
        }
        Ok(crops)
    }

    fn water_all(&mut self) -> Result<i64, ActionError> {
        self.take_failure("water_all")?;
        let mut crops = 0;
        for crop in self.crops.iter_mut().filter(|crop| !crop.watered) {
            crop.watered = true;
            crops += 1;
        }
        if crops > 0 {
            self.actions.push(FarmAction::Water { crops });
        }
        Ok(crops)
    }

    fn seconds_until_next_action(&self) -> Option<u64> {
        self.crops
            .iter()
            .map(|crop| crop.ready_at.saturating_sub(self.now))
            .min()
    }
}

impl MarketPort for InMemoryFarm {
    fn ranked_by_profitability(&self) -> Vec<ProductId> {
        let mut ranked: Vec<(f64, ProductId)> = self
            .products
            .values()
            .filter(|info| info.tradable)
            .map(|info| (self.relative_win(info), info.id))
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        ranked.into_iter().map(|(_, product)| product).collect()
    }

    fn sell_price(&self, product: ProductId) -> Option<Cents> {
        let info = self.products.get(&product)?;
        if !info.tradable {
            return None;
        }
        let reference = match self.market_offers.get(&product) {
            Some(offer) if *offer < info.npc_price => *offer,
            _ => info.npc_price,
        };
        Some((reference - 1).max(0))
    }

    fn min_sell_quantity(&self) -> i64 {
        self.most_profitable()
            .map(|info| self.plantable_tiles * (info.harvest_quantity - 1).max(0))
            .unwrap_or(0)
    }

    fn protected_money_floor(&self) -> Cents {
        self.most_profitable()
            .and_then(|info| self.sell_price(info.id))
            .map(|price| self.plantable_tiles * price)
            .unwrap_or(0)
    }

    fn sell(&mut self, product: ProductId, quantity: i64, price: Cents) -> Result<(), ActionError> {
        self.take_failure("sell")?;
        self.info(product)?;
        let available = self.stock(product);
        if quantity > available {
            return Err(ActionError::Insufficient {
                what: "stock",
                required: quantity,
                available,
            });
        }
        if quantity <= 0 {
            return Ok(());
        }

        let revenue = quantity * price;
        let fee = revenue * MARKET_FEE_PERCENT / 100;
        *self.stock.entry(product).or_insert(0) -= quantity;
        self.money += revenue - fee;
        self.actions.push(FarmAction::Sell {
            product,
            quantity,
            price,
        });
        Ok(())
    }

    fn buy_cheapest(
        &mut self,
        product: ProductId,
        quantity: i64,
        budget: Cents,
    ) -> Result<i64, ActionError> {
        self.take_failure("buy_cheapest")?;
        let price = {
            let info = self.info(product)?;
            self.buy_price(info)
        };
        let budget = budget.min(self.money);
        if budget <= 0 || quantity <= 0 || price <= 0 {
            return Ok(0);
        }

        let bought = quantity.min(budget / price);
        if bought == 0 {
            return Ok(0);
        }
        let spent = bought * price;
        self.money -= spent;
        *self.stock.entry(product).or_insert(0) += bought;
        self.actions.push(FarmAction::Buy {
            product,
            quantity: bought,
            spent,
        });
        Ok(bought)
    }
}

impl AccountPort for InMemoryFarm {
    fn money(&self) -> Cents {
        self.money
    }
}

impl QuestPort for InMemoryFarm {
    fn active_quest(&self) -> Option<QuestDefinition> {
        self.quest.clone().filter(|quest| !quest.done)
    }

    fn submit_quest_product(
        &mut self,
        quest: QuestRef,
        product: ProductId,
        quantity: i64,
    ) -> Result<(), ActionError> {
        self.take_failure("submit_quest_product")?;
        let available = self.stock(product);
        let active = self
            .quest
            .as_mut()
            .filter(|active| active.quest == quest && !active.done)
            .ok_or(ActionError::UnknownQuest(quest))?;
        if quantity > available {
            return Err(ActionError::Insufficient {
                what: "stock",
                required: quantity,
                available,
            });
        }

        *active.have.entry(product).or_insert(0) += quantity;
        active.done = active.missing().is_empty();
        *self.stock.entry(product).or_insert(0) -= quantity;
        self.actions.push(FarmAction::SubmitQuestProduct {
            quest,
            product,
            quantity,
        });
        Ok(())
    }
}
