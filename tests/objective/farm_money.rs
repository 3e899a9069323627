use wurzel::{
    config::SchedulerConfig,
    ledger::{Holder, Quantity, ReservationLedger, ResourceKey},
    objective::{Goal, TickContext, catalogue::FarmMoney},
    world::{AccountPort, FarmAction, InMemoryFarm, ProductId, ProductInfo, StoragePort},
};

use crate::{CARROT, SALAD, farm, snapshot};

const BEET: ProductId = ProductId(3);

/// Adds beet (relative win 302.4) between salad and carrot.
fn farm_with_beet(money: i64, stock: &[(ProductId, i64)]) -> InMemoryFarm {
    let mut state = snapshot(money, stock);
    state.products.push(ProductInfo {
        id: BEET,
        name: "beet".to_string(),
        harvest_quantity: 2,
        footprint: (1, 1),
        npc_price: 15,
        grow_secs: 3_600,
        tradable: true,
    });
    InMemoryFarm::from_snapshot(state)
}

/// Same farm with new market offers, which reorders the profitability ranking.
fn with_offers(world: &InMemoryFarm, offers: &[(ProductId, i64)]) -> InMemoryFarm {
    let mut state = world.snapshot();
    state.market_offers = offers.iter().copied().collect();
    InMemoryFarm::from_snapshot(state)
}

fn reserve(
    goal: &mut FarmMoney,
    holder: &Holder,
    ledger: &mut ReservationLedger,
    world: &mut InMemoryFarm,
    config: &SchedulerConfig,
) -> bool {
    let mut ctx = TickContext::begin(ledger, world, config);
    goal.get_work_reservations(holder, &mut ctx)
        .expect("reservations should succeed")
}

fn work(
    goal: &mut FarmMoney,
    holder: &Holder,
    ledger: &mut ReservationLedger,
    world: &mut InMemoryFarm,
    config: &SchedulerConfig,
) {
    let mut ctx = TickContext::begin(ledger, world, config);
    goal.work(holder, &mut ctx).expect("work should succeed");
}

#[test]
fn given_ranking_changes_twice_when_reserving_then_main_rotates_and_older_previous_is_freed() {
    let mut world = farm_with_beet(0, &[]);
    let mut ledger = ReservationLedger::new();
    let config = SchedulerConfig::default();
    let holder = ledger.register_holder(10);
    let mut goal = FarmMoney::new(None, true);

    reserve(&mut goal, &holder, &mut ledger, &mut world, &config);
    assert_eq!(goal.plant(), Some(SALAD));
    assert_eq!(goal.previous_plant(), None);

    // salad drops to 8: beet 302.4, carrot 194.4, salad 172.8
    let mut world = with_offers(&world, &[(SALAD, 9)]);
    reserve(&mut goal, &holder, &mut ledger, &mut world, &config);
    assert_eq!(goal.plant(), Some(BEET));
    assert_eq!(goal.previous_plant(), Some(SALAD));
    assert_eq!(
        ledger.claim(&holder, &ResourceKey::Plant(SALAD)),
        Some(Quantity::Unbounded)
    );

    // beet drops to 4: carrot 194.4, salad 172.8, beet 86.4
    let mut world = with_offers(&world, &[(SALAD, 9), (BEET, 5)]);
    reserve(&mut goal, &holder, &mut ledger, &mut world, &config);
    assert_eq!(goal.plant(), Some(CARROT));
    assert_eq!(goal.previous_plant(), Some(BEET));
    assert_eq!(ledger.claim(&holder, &ResourceKey::Plant(SALAD)), None);
    assert_eq!(
        ledger.claim(&holder, &ResourceKey::Plant(BEET)),
        Some(Quantity::Unbounded)
    );
    assert_eq!(
        ledger.claim(&holder, &ResourceKey::Plant(CARROT)),
        Some(Quantity::Unbounded)
    );
}

#[test]
fn given_runner_up_below_reserve_floor_when_reserving_then_next_ranked_product_is_fallback() {
    let mut world = farm_with_beet(0, &[(BEET, 8), (CARROT, 12)]);
    let mut ledger = ReservationLedger::new();
    let config = SchedulerConfig::default();
    let holder = ledger.register_holder(10);
    let mut goal = FarmMoney::new(None, true);

    let granted = reserve(&mut goal, &holder, &mut ledger, &mut world, &config);

    assert!(granted);
    assert_eq!(goal.plant(), Some(SALAD));
    assert_eq!(goal.fallback(), Some(CARROT));
    assert_eq!(ledger.claim(&holder, &ResourceKey::Plant(BEET)), None);
}

#[test]
fn given_no_product_reaches_reserve_floor_when_reserving_then_largest_owned_product_is_fallback() {
    let mut world = farm_with_beet(0, &[(BEET, 8), (CARROT, 6)]);
    let mut ledger = ReservationLedger::new();
    let config = SchedulerConfig::default();
    let holder = ledger.register_holder(10);
    let mut goal = FarmMoney::new(None, true);

    reserve(&mut goal, &holder, &mut ledger, &mut world, &config);

    assert_eq!(goal.plant(), Some(SALAD));
    assert_eq!(goal.fallback(), Some(BEET));
    assert_eq!(
        ledger.claim(&holder, &ResourceKey::Plant(BEET)),
        Some(Quantity::Unbounded)
    );
}

#[test]
fn given_previous_product_below_keep_back_when_working_then_its_claim_is_retired() {
    let mut world = farm_with_beet(0, &[(SALAD, 15), (BEET, 8), (CARROT, 12)]);
    let mut ledger = ReservationLedger::new();
    let config = SchedulerConfig::default();
    let holder = ledger.register_holder(10);
    let mut goal = FarmMoney::new(None, true);
    reserve(&mut goal, &holder, &mut ledger, &mut world, &config);
    assert_eq!(goal.plant(), Some(SALAD));

    let mut world = with_offers(&world, &[(SALAD, 9)]);
    world.set_stock(SALAD, 5);
    assert!(reserve(&mut goal, &holder, &mut ledger, &mut world, &config));
    assert_eq!(goal.plant(), Some(BEET));
    assert_eq!(goal.fallback(), Some(CARROT));
    assert_eq!(goal.previous_plant(), Some(SALAD));
    assert_eq!(
        ledger.claim(&holder, &ResourceKey::Plant(SALAD)),
        Some(Quantity::Unbounded)
    );

    work(&mut goal, &holder, &mut ledger, &mut world, &config);

    // keep back = reserve floor 10 + minimum sell quantity 10 > 5 salads
    assert_eq!(goal.previous_plant(), None);
    assert_eq!(ledger.claim(&holder, &ResourceKey::Plant(SALAD)), None);
    assert_eq!(world.stock(SALAD), 5);
    assert!(world.actions().contains(&FarmAction::Plant {
        product: BEET,
        count: 8,
    }));
    assert!(world.actions().contains(&FarmAction::Plant {
        product: CARROT,
        count: 2,
    }));
}

#[test]
fn given_money_below_floor_when_reserving_then_a_few_seeds_are_bought_with_half_the_cash() {
    let mut world = farm(100, &[]);
    let mut ledger = ReservationLedger::new();
    let config = SchedulerConfig::default();
    let holder = ledger.register_holder(10);
    let mut goal = FarmMoney::new(None, true);

    let granted = reserve(&mut goal, &holder, &mut ledger, &mut world, &config);

    assert!(granted);
    assert_eq!(
        world.actions(),
        &[FarmAction::Buy {
            product: SALAD,
            quantity: 2,
            spent: 40,
        }]
    );
    assert_eq!(world.money(), 60);
    assert_eq!(ledger.claim(&holder, &ResourceKey::Money), None);
}

#[test]
fn given_top_up_disabled_when_money_is_below_floor_then_no_seeds_are_bought() {
    let mut world = farm(100, &[]);
    let mut ledger = ReservationLedger::new();
    let config = SchedulerConfig {
        seed_top_up_quantity: 0,
        ..SchedulerConfig::default()
    };
    let holder = ledger.register_holder(10);
    let mut goal = FarmMoney::new(None, true);

    let granted = reserve(&mut goal, &holder, &mut ledger, &mut world, &config);

    assert!(!granted);
    assert!(world.actions().is_empty());
    assert_eq!(world.money(), 100);
}

#[test]
fn given_new_main_was_fallback_when_reserving_then_no_product_holds_two_slots() {
    let mut world = farm(0, &[(SALAD, 12), (CARROT, 12)]);
    let mut ledger = ReservationLedger::new();
    let config = SchedulerConfig::default();
    let holder = ledger.register_holder(10);
    let mut goal = FarmMoney::new(None, true);
    reserve(&mut goal, &holder, &mut ledger, &mut world, &config);
    assert_eq!(goal.plant(), Some(SALAD));
    assert_eq!(goal.fallback(), Some(CARROT));

    // salad drops to 8: carrot 194.4, salad 172.8
    let mut world = with_offers(&world, &[(SALAD, 9)]);
    reserve(&mut goal, &holder, &mut ledger, &mut world, &config);
    assert_eq!(goal.plant(), Some(CARROT));
    assert_eq!(goal.fallback(), Some(SALAD));
    assert_eq!(goal.previous_plant(), None);
    assert_eq!(goal.previous_fallback(), None);
    assert_eq!(
        ledger.claim(&holder, &ResourceKey::Tile),
        Some(Quantity::Units(24))
    );

    work(&mut goal, &holder, &mut ledger, &mut world, &config);

    assert_eq!(
        ledger.claim(&holder, &ResourceKey::Plant(SALAD)),
        Some(Quantity::Unbounded)
    );
    assert_eq!(world.crops().len(), 10);
    assert!(world.crops().iter().all(|crop| crop.product == CARROT));
}
