pub mod error;
pub mod in_memory;
pub mod ports;
pub mod types;

pub use error::ActionError;
pub use in_memory::{FarmAction, FarmSnapshot, GrowingCrop, InMemoryFarm};
pub use ports::{AccountPort, GameWorld, GardenPort, MarketPort, QuestPort, StoragePort};
pub use types::{
    Cents, ProductId, ProductInfo, QuestDefinition, QuestRef, Timestamp, Weed, WeedId,
    reserve_floor_for,
};
