//! Condition behavior integration tests.
//!
//! Scenario coverage for the shipped variants: predicate gating,
//! turn-boundary self-expiry with removal notices, and loader/factory
//! failure modes.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use rust_tactics::events::topics::{
    ATTACK_OCCURRED, CONDITION_REMOVED, DAMAGE_RECEIVED, DAMAGE_ROLL, MOVEMENT, TURN_ENDED,
    TURN_STARTED,
};
use rust_tactics::query::AttributeTable;
use rust_tactics::{
    AttackOccurred, Condition, ConditionRegistry, ConditionRemoved, DamageReceived, DamageRoll,
    DefensiveStance, EngineError, EventBus, ModifierSource, MovementCheck, QueryPorts, Rage,
    RemovalReason, Slowed, TurnEvent, COMBAT_STAGES,
};

/// Collect every removal notice published on a bus.
fn removal_log(bus: &EventBus) -> Rc<RefCell<Vec<ConditionRemoved>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    bus.subscribe(CONDITION_REMOVED, move |_, notice: &mut ConditionRemoved| {
        sink.borrow_mut().push(notice.clone());
        Ok(())
    });
    log
}

fn end_turn(bus: &EventBus, character: &str, round: u32) {
    bus.publish(TURN_ENDED, &mut TurnEvent::new(character, round))
        .unwrap();
}

/// A critical-hit bonus-dice condition bound to "barbarian-1" at level
/// 13 adds exactly 2 extra bonus-sourced entries iff the attacker
/// matches and the roll is critical.
#[test]
fn test_brutal_critical_scenario_matrix() {
    let registry = ConditionRegistry::standard();
    let bus = EventBus::new();

    let feature = registry
        .create(
            "class:barbarian:brutal-critical",
            &json!({"level": 13}),
            "barbarian-1",
            "class-feature",
        )
        .unwrap();
    Rc::clone(&feature).apply(&QueryPorts::none(), &bus).unwrap();

    let greataxe = || ModifierSource::base("Greataxe");
    let bonus_origin = "class:barbarian:brutal-critical";

    // Matching attacker, critical: exactly two extra dice.
    let roll = bus
        .dispatch(
            DAMAGE_ROLL,
            &COMBAT_STAGES,
            DamageRoll::new("barbarian-1", "goblin-3")
                .critical()
                .with_die(greataxe(), 12),
        )
        .unwrap();
    assert_eq!(roll.components_from(bonus_origin).count(), 2);
    assert_eq!(roll.dice_count(), 3);

    // Matching attacker, not critical: nothing.
    let roll = bus
        .dispatch(
            DAMAGE_ROLL,
            &COMBAT_STAGES,
            DamageRoll::new("barbarian-1", "goblin-3").with_die(greataxe(), 12),
        )
        .unwrap();
    assert_eq!(roll.components_from(bonus_origin).count(), 0);

    // Different attacker, critical: nothing.
    let roll = bus
        .dispatch(
            DAMAGE_ROLL,
            &COMBAT_STAGES,
            DamageRoll::new("fighter-1", "goblin-3")
                .critical()
                .with_die(greataxe(), 8),
        )
        .unwrap();
    assert_eq!(roll.components_from(bonus_origin).count(), 0);

    // Different attacker, not critical: nothing.
    let roll = bus
        .dispatch(
            DAMAGE_ROLL,
            &COMBAT_STAGES,
            DamageRoll::new("fighter-1", "goblin-3").with_die(greataxe(), 8),
        )
        .unwrap();
    assert_eq!(roll.components_from(bonus_origin).count(), 0);
}

/// Rage ends at the bearer's turn end when nothing sustained it, with
/// exactly one NoActivity notice.
#[test]
fn test_rage_expires_no_activity() {
    let bus = EventBus::new();
    let log = removal_log(&bus);

    let rage = Rc::new(Rage::new("barbarian-1", 5));
    Rc::clone(&rage).apply(&QueryPorts::none(), &bus).unwrap();

    // Someone else's turn boundary is not the bearer's.
    end_turn(&bus, "goblin-3", 1);
    assert!(rage.is_applied());
    assert!(log.borrow().is_empty());

    end_turn(&bus, "barbarian-1", 1);
    assert!(!rage.is_applied(), "idle after expiring");

    let notices = log.borrow();
    assert_eq!(notices.len(), 1, "exactly one removal notice");
    assert_eq!(notices[0].reason, RemovalReason::NoActivity);
    assert_eq!(notices[0].condition, Rage::reference());
    assert_eq!(notices[0].character.as_str(), "barbarian-1");
}

/// Attacking sustains the rage through the bearer's turn end.
#[test]
fn test_rage_sustained_by_attacking() {
    let bus = EventBus::new();
    let log = removal_log(&bus);

    let rage = Rc::new(Rage::new("barbarian-1", 5));
    Rc::clone(&rage).apply(&QueryPorts::none(), &bus).unwrap();

    let mut attack = AttackOccurred {
        attacker: "barbarian-1".into(),
        target: "goblin-3".into(),
        hit: true,
    };
    bus.publish(ATTACK_OCCURRED, &mut attack).unwrap();

    end_turn(&bus, "barbarian-1", 1);
    assert!(rage.is_applied(), "activity must carry rage past the boundary");
    assert!(log.borrow().is_empty());

    // The activity flag resets each round; an idle round ends it.
    end_turn(&bus, "barbarian-1", 2);
    assert!(!rage.is_applied());
    assert_eq!(log.borrow()[0].reason, RemovalReason::NoActivity);
}

/// A rage sustained every round still runs out of rounds.
#[test]
fn test_rage_expires_duration() {
    let bus = EventBus::new();
    let log = removal_log(&bus);

    let registry = ConditionRegistry::standard();
    let payload = json!({
        "ref": "class:barbarian:rage",
        "character": "barbarian-1",
        "level": 5,
        "rounds_remaining": 2,
    });
    let rage = registry.load(&payload).unwrap();
    Rc::clone(&rage).apply(&QueryPorts::none(), &bus).unwrap();

    for round in 1..=2 {
        let mut attack = AttackOccurred {
            attacker: "barbarian-1".into(),
            target: "goblin-3".into(),
            hit: true,
        };
        bus.publish(ATTACK_OCCURRED, &mut attack).unwrap();
        end_turn(&bus, "barbarian-1", round);
    }

    assert!(!rage.is_applied());
    let notices = log.borrow();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].reason, RemovalReason::DurationExpired);
}

/// Dropping unconscious ends the rage immediately, from inside the
/// damage handler.
#[test]
fn test_rage_expires_unconscious() {
    let bus = EventBus::new();
    let log = removal_log(&bus);

    let rage = Rc::new(Rage::new("barbarian-1", 5));
    Rc::clone(&rage).apply(&QueryPorts::none(), &bus).unwrap();

    let mut damage = DamageReceived {
        attacker: "goblin-3".into(),
        target: "barbarian-1".into(),
        total: 17,
        dropped: true,
    };
    bus.publish(DAMAGE_RECEIVED, &mut damage).unwrap();

    assert!(!rage.is_applied());
    let notices = log.borrow();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].reason, RemovalReason::Unconscious);
}

/// Non-dropping damage sustains rather than ends the rage.
#[test]
fn test_rage_sustained_by_taking_damage() {
    let bus = EventBus::new();
    let rage = Rc::new(Rage::new("barbarian-1", 5));
    Rc::clone(&rage).apply(&QueryPorts::none(), &bus).unwrap();

    let mut damage = DamageReceived {
        attacker: "goblin-3".into(),
        target: "barbarian-1".into(),
        total: 6,
        dropped: false,
    };
    bus.publish(DAMAGE_RECEIVED, &mut damage).unwrap();

    end_turn(&bus, "barbarian-1", 1);
    assert!(rage.is_applied());
}

/// Defensive stance expires on the bearer's own turn start with a
/// TurnStart notice; other turn starts leave it alone.
#[test]
fn test_defensive_stance_expires_on_own_turn_start() {
    let bus = EventBus::new();
    let log = removal_log(&bus);

    let ports = QueryPorts::none()
        .with_attributes(AttributeTable::new().with_equipped("fighter-1", "shield"));
    let stance = Rc::new(DefensiveStance::new("fighter-1"));
    Rc::clone(&stance).apply(&ports, &bus).unwrap();

    bus.publish(TURN_STARTED, &mut TurnEvent::new("rogue-1", 2))
        .unwrap();
    assert!(stance.is_applied());

    bus.publish(TURN_STARTED, &mut TurnEvent::new("fighter-1", 2))
        .unwrap();
    assert!(!stance.is_applied());

    let notices = log.borrow();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].reason, RemovalReason::TurnStart);
    assert_eq!(notices[0].condition, DefensiveStance::reference());
}

/// A condition bound to one character never mutates another
/// character's event, whatever else is going on.
#[test]
fn test_conditions_only_touch_their_own_character() {
    let bus = EventBus::new();

    let rage = Rc::new(Rage::new("barbarian-1", 5));
    Rc::clone(&rage).apply(&QueryPorts::none(), &bus).unwrap();
    let slowed = Rc::new(Slowed::new("barbarian-1"));
    Rc::clone(&slowed).apply(&QueryPorts::none(), &bus).unwrap();

    let roll = bus
        .dispatch(
            DAMAGE_ROLL,
            &COMBAT_STAGES,
            DamageRoll::new("fighter-1", "goblin-3"),
        )
        .unwrap();
    assert_eq!(roll.flat_total(), 0, "rage must not touch fighter-1's roll");

    let movement = bus
        .dispatch(MOVEMENT, &COMBAT_STAGES, MovementCheck::new("fighter-1", 30))
        .unwrap();
    assert_eq!(movement.speed, 30, "slow must not touch fighter-1's speed");
}

/// Loader dispatch on an unknown ref fails and returns no object.
#[test]
fn test_loader_unknown_ref_fails_not_found() {
    let registry = ConditionRegistry::standard();
    let payload = json!({
        "ref": "spell:x:totally-unknown",
        "character": "cleric-1",
    });

    let err = registry.load(&payload).unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)), "got {err:?}");
}

/// Unparseable payloads fail InvalidArgument at peek time.
#[test]
fn test_loader_rejects_malformed_payloads() {
    let registry = ConditionRegistry::standard();

    for payload in [
        json!("just a string"),
        json!({"character": "cleric-1"}),
        json!({"ref": "missing-segments"}),
    ] {
        let err = registry.load(&payload).unwrap_err();
        assert!(
            matches!(err, EngineError::InvalidArgument(_)),
            "payload {payload} got {err:?}"
        );
    }
}

/// A full round: factory-created conditions fight through a turn and
/// expire on their own schedule.
#[test]
fn test_factory_conditions_through_a_combat_round() {
    let registry = ConditionRegistry::standard();
    let bus = EventBus::new();
    let log = removal_log(&bus);

    let rage = registry
        .create(
            "class:barbarian:rage",
            &json!({"level": 9}),
            "barbarian-1",
            "bonus-action",
        )
        .unwrap();
    Rc::clone(&rage).apply(&QueryPorts::none(), &bus).unwrap();

    let slowed = registry
        .create(
            "spell:transmutation:slowed",
            &json!({"rounds": 1}),
            "barbarian-1",
            "enemy-spell",
        )
        .unwrap();
    Rc::clone(&slowed).apply(&QueryPorts::none(), &bus).unwrap();

    // The slowed barbarian closes in at half speed and swings.
    let movement = bus
        .dispatch(
            MOVEMENT,
            &COMBAT_STAGES,
            MovementCheck::new("barbarian-1", 40),
        )
        .unwrap();
    assert_eq!(movement.speed, 20);

    let roll = bus
        .dispatch(
            DAMAGE_ROLL,
            &COMBAT_STAGES,
            DamageRoll::new("barbarian-1", "goblin-3")
                .with_die(ModifierSource::base("Greataxe"), 12),
        )
        .unwrap();
    assert_eq!(roll.flat_total(), 3, "level 9 rage adds +3");

    let mut attack = AttackOccurred {
        attacker: "barbarian-1".into(),
        target: "goblin-3".into(),
        hit: true,
    };
    bus.publish(ATTACK_OCCURRED, &mut attack).unwrap();

    // Turn end: the slow's single round is up, the sustained rage
    // carries on.
    end_turn(&bus, "barbarian-1", 1);

    assert!(rage.is_applied());
    assert!(!slowed.is_applied());
    let notices = log.borrow();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].condition, Slowed::reference());
    assert_eq!(notices[0].reason, RemovalReason::DurationExpired);

    // Next round, unslowed.
    let movement = bus
        .dispatch(
            MOVEMENT,
            &COMBAT_STAGES,
            MovementCheck::new("barbarian-1", 40),
        )
        .unwrap();
    assert_eq!(movement.speed, 40);
}
