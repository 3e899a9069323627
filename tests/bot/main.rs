
use std::collections::BTreeMap;

use wurzel::{
    bot::BotRunner,
    config::{BotLoopConfig, SchedulerConfig},
    world::{FarmSnapshot, GrowingCrop, InMemoryFarm, ProductId, ProductInfo},
};

pub const CARROT: ProductId = ProductId(1);
pub const SALAD: ProductId = ProductId(2);

pub fn crop(product: ProductId, ready_at: u64) -> GrowingCrop {
    GrowingCrop {
        product,
        ready_at,
        watered: false,
    }
}

pub fn snapshot(money: i64, stock: &[(ProductId, i64)], crops: Vec<GrowingCrop>) -> FarmSnapshot {
    FarmSnapshot {
        now: 0,
        money,
        plantable_tiles: 10,
        products: vec![
            ProductInfo {
                id: CARROT,
                name: "carrot".to_string(),
                harvest_quantity: 2,
                footprint: (1, 1),
                npc_price: 10,
                grow_secs: 3_600,
                tradable: true,
            },
            ProductInfo {
                id: SALAD,
                name: "salad".to_string(),
                harvest_quantity: 3,
                footprint: (1, 1),
                npc_price: 20,
                grow_secs: 7_200,
                tradable: true,
            },
        ],
        stock: stock.iter().copied().collect(),
        crops,
        weeds: Vec::new(),
        quest: None,
        market_offers: BTreeMap::new(),
    }
}

pub fn runner(snapshot: FarmSnapshot, loop_config: BotLoopConfig) -> BotRunner<InMemoryFarm> {
    BotRunner::new(
        InMemoryFarm::from_snapshot(snapshot),
        SchedulerConfig::default(),
        loop_config,
    )
}
