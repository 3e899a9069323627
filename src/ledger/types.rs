use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    objective::error::{SchedulerError, invalid_request},
    world::types::ProductId,
};

/// Lower value is served first.
pub type Priority = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Holder {
    pub id: HolderId,
    pub priority: Priority,
}

impl Holder {
    /// True when `self` is served strictly before `other`.
    pub fn outranks(&self, other: &Holder) -> bool {
        self.priority < other.priority
    }
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "holder:{}@{}", self.id.0, self.priority)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Tile,
    Plant,
    Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "product", rename_all = "snake_case")]
pub enum ResourceKey {
    Tile,
    Plant(ProductId),
    Money,
}

impl ResourceKey {
    pub fn from_parts(
        kind: ResourceKind,
        product: Option<ProductId>,
    ) -> Result<Self, SchedulerError> {
        match (kind, product) {
            (ResourceKind::Plant, Some(product)) => Ok(Self::Plant(product)),
            (ResourceKind::Plant, None) => Err(invalid_request(
                "plant reservations require a product key",
            )),
            (ResourceKind::Tile, None) => Ok(Self::Tile),
            (ResourceKind::Money, None) => Ok(Self::Money),
            (kind, Some(product)) => Err(invalid_request(format!(
                "{kind:?} reservations do not take a product key, got {product}"
            ))),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Tile => ResourceKind::Tile,
            Self::Plant(_) => ResourceKind::Plant,
            Self::Money => ResourceKind::Money,
        }
    }

    pub fn product(&self) -> Option<ProductId> {
        match self {
            Self::Plant(product) => Some(*product),
            Self::Tile | Self::Money => None,
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tile => write!(f, "tile"),
            Self::Plant(product) => write!(f, "plant({product})"),
            Self::Money => write!(f, "money"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Units(i64),
    /// Take all that remains.
    Unbounded,
}

impl Quantity {
    pub fn bounded(self) -> Option<i64> {
        match self {
            Self::Units(units) => Some(units),
            Self::Unbounded => None,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl From<i64> for Quantity {
    fn from(units: i64) -> Self {
        Self::Units(units)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Units(units) => write!(f, "{units}"),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub holder: Holder,
    pub quantity: Quantity,
}

/// Capacity of a resource at the moment of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capacity {
    /// Potential capacity, including what is still in production.
    pub theoretical: i64,
    /// Capacity usable right now.
    pub actual: i64,
}

/// Generation marker handed out by `ReservationLedger::begin_tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickToken {
    pub generation: u64,
}
