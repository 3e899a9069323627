use std::fmt;

use crate::world::types::{ProductId, QuestRef, WeedId};

/// Class of an objective together with the concrete target it works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectiveKind {
    FarmMoneyMain,
    FarmMoney,
    FarmPlant(ProductId),
    ProvidePlant(ProductId),
    RemoveWeed(WeedId),
    BigQuest(QuestRef),
}

impl ObjectiveKind {
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::FarmMoneyMain => "farm_money_main",
            Self::FarmMoney => "farm_money",
            Self::FarmPlant(_) => "farm_plant",
            Self::ProvidePlant(_) => "provide_plant",
            Self::RemoveWeed(_) => "remove_weed",
            Self::BigQuest(_) => "big_quest",
        }
    }
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}
