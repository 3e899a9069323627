use wurzel::{
    config::SchedulerConfig,
    ledger::{ReservationLedger, ResourceKey},
    objective::{Objective, ObjectiveKind, SchedulerError, SchedulerErrorKind, TickContext},
    world::WeedId,
};

use crate::{Journal, ScriptedGoal, farm};

fn step(ledger: &mut ReservationLedger, objective: &mut Objective) -> Result<bool, SchedulerError> {
    let mut world = farm(0, &[]);
    let config = SchedulerConfig::default();
    let mut ctx = TickContext::begin(ledger, &mut world, &config);
    objective.work_if_possible(&mut ctx)
}

fn scripted(ledger: &mut ReservationLedger, priority: u32, goal: ScriptedGoal) -> Objective {
    Objective::new(ledger.register_holder(priority), goal)
}

#[test]
fn given_unfinished_prerequisite_when_step_then_parent_hooks_never_run() {
    let journal = Journal::default();
    let mut ledger = ReservationLedger::new();
    let mut child_goal = ScriptedGoal::new("child", &journal);
    child_goal.grant_work = false;
    let child = scripted(&mut ledger, 3, child_goal);
    let mut parent =
        scripted(&mut ledger, 3, ScriptedGoal::new("parent", &journal)).with_prerequisite(child);

    let done = step(&mut ledger, &mut parent).expect("step should succeed");

    assert!(!done);
    assert_eq!(parent.prerequisites().len(), 1);
    assert_eq!(
        journal.entries(),
        vec![
            "child:get_reservations",
            "child:is_reached",
            "child:get_work_reservations",
        ]
    );
}

#[test]
fn given_prerequisite_completing_when_step_then_parent_proceeds_in_same_step() {
    let journal = Journal::default();
    let mut ledger = ReservationLedger::new();
    let mut child_goal = ScriptedGoal::new("child", &journal);
    child_goal.reached = true;
    let mut parent_goal = ScriptedGoal::new("parent", &journal);
    parent_goal.reached = true;
    let child = scripted(&mut ledger, 2, child_goal);
    let mut parent = scripted(&mut ledger, 2, parent_goal).with_prerequisite(child);

    let done = step(&mut ledger, &mut parent).expect("step should succeed");

    assert!(done);
    assert!(parent.prerequisites().is_empty());
    assert_eq!(
        journal.entries(),
        vec![
            "child:get_reservations",
            "child:is_reached",
            "child:get_finish_reservations",
            "child:finish",
            "parent:get_reservations",
            "parent:is_reached",
            "parent:get_finish_reservations",
            "parent:finish",
        ]
    );
}

#[test]
fn given_denied_reservations_when_step_then_objective_yields_before_checking_goal() {
    let journal = Journal::default();
    let mut ledger = ReservationLedger::new();
    let mut goal = ScriptedGoal::new("goal", &journal);
    goal.grant_reservations = false;
    goal.reached = true;
    let mut objective = scripted(&mut ledger, 1, goal);

    let done = step(&mut ledger, &mut objective).expect("step should succeed");

    assert!(!done);
    assert_eq!(journal.entries(), vec!["goal:get_reservations"]);
}

#[test]
fn given_reached_goal_with_denied_finish_when_step_then_work_runs_and_finish_never_does() {
    let journal = Journal::default();
    let mut ledger = ReservationLedger::new();
    let mut goal = ScriptedGoal::new("goal", &journal);
    goal.reached = true;
    goal.grant_finish = false;
    let mut objective = scripted(&mut ledger, 1, goal);

    let done = step(&mut ledger, &mut objective).expect("step should succeed");

    assert!(!done);
    assert!(!journal.contains("goal:finish"));
    assert_eq!(objective.finish_attempts(), 0);
    assert_eq!(
        journal.entries(),
        vec![
            "goal:get_reservations",
            "goal:is_reached",
            "goal:get_finish_reservations",
            "goal:get_work_reservations",
            "goal:work",
            "goal:is_reached",
            "goal:get_finish_reservations",
        ]
    );
}

#[test]
fn given_work_that_reaches_goal_when_step_then_objective_finishes_in_same_step() {
    let journal = Journal::default();
    let mut ledger = ReservationLedger::new();
    let mut goal = ScriptedGoal::new("goal", &journal);
    goal.reached_after_work = true;
    let mut objective = scripted(&mut ledger, 1, goal);

    let done = step(&mut ledger, &mut objective).expect("step should succeed");

    assert!(done);
    assert_eq!(objective.finish_attempts(), 1);
    assert_eq!(
        journal.entries(),
        vec![
            "goal:get_reservations",
            "goal:is_reached",
            "goal:get_work_reservations",
            "goal:work",
            "goal:is_reached",
            "goal:get_finish_reservations",
            "goal:finish",
        ]
    );
}

#[test]
fn given_denied_work_reservations_when_step_then_work_is_skipped() {
    let journal = Journal::default();
    let mut ledger = ReservationLedger::new();
    let mut goal = ScriptedGoal::new("goal", &journal);
    goal.grant_work = false;
    let mut objective = scripted(&mut ledger, 1, goal);

    let done = step(&mut ledger, &mut objective).expect("step should succeed");

    assert!(!done);
    assert!(!journal.contains("goal:work"));
}

#[test]
fn given_failing_finish_when_stepped_twice_then_error_surfaces_and_retry_completes() {
    let journal = Journal::default();
    let mut ledger = ReservationLedger::new();
    let mut goal = ScriptedGoal::new("goal", &journal);
    goal.reached = true;
    goal.finish_failures = 1;
    let mut objective = scripted(&mut ledger, 1, goal);

    let err = step(&mut ledger, &mut objective).expect_err("first finish should fail");
    assert_eq!(err.kind, SchedulerErrorKind::External);
    assert_eq!(objective.finish_attempts(), 1);

    let done = step(&mut ledger, &mut objective).expect("retry should succeed");
    assert!(done);
    assert_eq!(objective.finish_attempts(), 2);
}

#[test]
fn given_finish_that_leaves_a_claim_when_completed_then_claims_are_released() {
    let journal = Journal::default();
    let mut ledger = ReservationLedger::new();
    let mut goal = ScriptedGoal::new("goal", &journal);
    goal.reached = true;
    goal.claim_on_finish = Some(ResourceKey::Tile);
    let mut objective = scripted(&mut ledger, 1, goal);
    let holder = *objective.holder();

    let done = step(&mut ledger, &mut objective).expect("step should succeed");

    assert!(done);
    assert!(ledger.holdings(&holder).is_empty());
    assert!(ledger.is_empty());
}

#[test]
fn given_scripted_goal_when_inspected_then_display_and_kind_follow_goal() {
    let journal = Journal::default();
    let mut ledger = ReservationLedger::new();
    let mut goal = ScriptedGoal::new("gate", &journal);
    goal.kind = ObjectiveKind::RemoveWeed(WeedId(7));
    let objective = scripted(&mut ledger, 7, goal);

    assert_eq!(objective.to_string(), "Scripted(gate)(priority=7)");
    assert_eq!(objective.kind(), ObjectiveKind::RemoveWeed(WeedId(7)));
    assert_eq!(objective.priority(), 7);
}
