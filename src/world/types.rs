use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// Money in integer cents.
pub type Cents = i64;

/// Game timestamp in seconds.
pub type Timestamp = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "product:{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: ProductId,
    pub name: String,
    /// Units gained from one harvested crop, including the replanted seed.
    pub harvest_quantity: i64,
    /// Tile footprint as (width, height).
    #[serde(default = "default_footprint")]
    pub footprint: (u8, u8),
    pub npc_price: Cents,
    pub grow_secs: u64,
    #[serde(default = "default_tradable")]
    pub tradable: bool,
}

fn default_footprint() -> (u8, u8) {
    (1, 1)
}

fn default_tradable() -> bool {
    true
}

impl ProductInfo {
    pub fn footprint_area(&self) -> i64 {
        (i64::from(self.footprint.0) * i64::from(self.footprint.1)).max(1)
    }
}

/// Minimum stock that keeps a full replant of the garden possible.
pub fn reserve_floor_for(plantable_capacity: i64, footprint_area: i64) -> i64 {
    if footprint_area <= 0 {
        return 0;
    }
    plantable_capacity.max(0) / footprint_area
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeedId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weed {
    pub id: WeedId,
    pub remove_cost: Cents,
    /// Tiles that become plantable once the weed is gone.
    #[serde(default = "default_weed_tiles")]
    pub tiles: i64,
}

fn default_weed_tiles() -> i64 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestRef {
    pub year_id: u32,
    pub quest_id: u32,
}

impl fmt::Display for QuestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quest:{}/{}", self.year_id, self.quest_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDefinition {
    pub quest: QuestRef,
    pub need: BTreeMap<ProductId, i64>,
    #[serde(default)]
    pub have: BTreeMap<ProductId, i64>,
    #[serde(default)]
    pub done: bool,
}

impl QuestDefinition {
    /// Quantities still to deliver, skipping products that are already covered.
    pub fn missing(&self) -> BTreeMap<ProductId, i64> {
        self.need
            .iter()
            .filter_map(|(product, needed)| {
                let delivered = self.have.get(product).copied().unwrap_or(0);
                let missing = needed - delivered;
                (missing > 0).then_some((*product, missing))
            })
            .collect()
    }
}
