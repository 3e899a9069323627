pub mod big_quest;
pub mod farm_money;
pub mod farm_money_main;
pub mod farm_plant;
pub mod provide_plant;
pub mod remove_weed;
pub mod selling;

pub use big_quest::BigQuest;
pub use farm_money::FarmMoney;
pub use farm_money_main::FarmMoneyMain;
pub use farm_plant::FarmPlant;
pub use provide_plant::ProvidePlant;
pub use remove_weed::RemoveWeed;
pub use selling::sell_surplus;
