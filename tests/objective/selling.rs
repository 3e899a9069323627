use wurzel::{
    objective::catalogue::sell_surplus,
    world::{AccountPort, FarmAction, GrowingCrop, InMemoryFarm, StoragePort},
};

use crate::{SALAD, farm, snapshot};

fn sold(world: &InMemoryFarm) -> Vec<i64> {
    world
        .actions()
        .iter()
        .filter_map(|action| match action {
            FarmAction::Sell { quantity, .. } => Some(*quantity),
            _ => None,
        })
        .collect()
}

#[test]
fn given_amount_below_min_sell_quantity_when_selling_then_stock_is_kept() {
    let mut world = farm(1_000, &[(SALAD, 50)]);

    let amount = sell_surplus(&mut world, SALAD, Some(5)).expect("sell should succeed");

    assert_eq!(amount, 0);
    assert_eq!(world.stock(SALAD), 50);
    assert!(sold(&world).is_empty());
}

#[test]
fn given_no_requested_amount_when_selling_then_everything_above_floor_is_sold() {
    let mut world = farm(1_000, &[(SALAD, 50)]);

    let amount = sell_surplus(&mut world, SALAD, None).expect("sell should succeed");

    assert_eq!(amount, 40);
    assert_eq!(world.stock(SALAD), 10);
    assert_eq!(sold(&world), vec![40]);
}

#[test]
fn given_growing_crops_when_selling_then_amount_is_capped_by_real_stock() {
    let mut state = snapshot(1_000, &[(SALAD, 30)]);
    state.crops = (0..10)
        .map(|_| GrowingCrop {
            product: SALAD,
            ready_at: 7_200,
            watered: false,
        })
        .collect();
    let mut world = InMemoryFarm::from_snapshot(state);
    assert_eq!(world.potential_quantity(SALAD), 60);

    let amount = sell_surplus(&mut world, SALAD, None).expect("sell should succeed");

    assert_eq!(amount, 30);
    assert_eq!(world.stock(SALAD), 0);
    assert_eq!(world.potential_quantity(SALAD), 30);
}

#[test]
fn given_little_cash_when_selling_then_amount_is_capped_by_payable_fee() {
    let mut world = farm(50, &[(SALAD, 100)]);

    let amount = sell_surplus(&mut world, SALAD, None).expect("sell should succeed");

    // 50 cents cover the 10% fee on 26 units at 19 cents
    assert_eq!(amount, 26);
    assert_eq!(world.stock(SALAD), 74);
    assert_eq!(world.money(), 50 + 26 * 19 - 26 * 19 / 10);
}

#[test]
fn given_no_stock_when_selling_then_nothing_happens() {
    let mut world = farm(1_000, &[]);

    let amount = sell_surplus(&mut world, SALAD, Some(25)).expect("sell should succeed");

    assert_eq!(amount, 0);
    assert!(world.actions().is_empty());
}

#[test]
fn given_rejected_sale_when_selling_then_external_error_surfaces() {
    let mut world = farm(1_000, &[(SALAD, 50)]);
    world.fail_next("sell", "market closed");

    let err = sell_surplus(&mut world, SALAD, None).expect_err("sale should fail");

    assert_eq!(err.kind, wurzel::objective::SchedulerErrorKind::External);
    assert_eq!(world.stock(SALAD), 50);
}
