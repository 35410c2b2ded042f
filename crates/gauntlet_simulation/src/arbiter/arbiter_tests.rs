//! Tests for the combat arbiter.

use super::*;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn handles(count: usize) -> Vec<Entity> {
    let mut world = World::new();
    (0..count).map(|_| world.spawn_empty().id()).collect()
}

fn engaged_at(position: Vec3) -> CombatantStatus {
    CombatantStatus {
        position,
        engaged: true,
        dead: false,
        vulnerable: false,
    }
}

fn arbiter_with_target() -> CombatArbiter {
    let mut arbiter = CombatArbiter::default();
    arbiter.set_target(Some(Vec3::ZERO));
    arbiter
}

#[test]
fn test_register_is_idempotent() {
    let h = handles(1);
    let mut arbiter = CombatArbiter::default();

    assert!(arbiter.register(h[0]));
    assert!(!arbiter.register(h[0]));
    assert_eq!(arbiter.roster_len(), 1);

    assert!(arbiter.unregister(h[0]));
    assert!(!arbiter.unregister(h[0]));
    assert!(arbiter.is_empty());
}

#[test]
fn test_first_request_wins_token() {
    let h = handles(2);
    let mut arbiter = CombatArbiter::default();
    arbiter.register(h[0]);
    arbiter.register(h[1]);

    assert!(arbiter.request_attack_permission(h[1]));
    assert!(!arbiter.request_attack_permission(h[0]));
    // Повторный запрос держателя — разрешён
    assert!(arbiter.request_attack_permission(h[1]));

    assert!(arbiter.should_wait(h[0]));
    assert!(!arbiter.should_wait(h[1]));
    assert_eq!(arbiter.token_holder(), Some(h[1]));
}

#[test]
fn test_should_wait_false_without_token() {
    let h = handles(1);
    let mut arbiter = CombatArbiter::default();
    arbiter.register(h[0]);

    assert!(!arbiter.should_wait(h[0]));
}

#[test]
fn test_release_by_non_holder_is_noop() {
    let h = handles(2);
    let mut arbiter = CombatArbiter::default();
    arbiter.register(h[0]);
    arbiter.register(h[1]);
    arbiter.request_attack_permission(h[0]);

    assert!(!arbiter.release_attack_permission(h[1]));
    assert_eq!(arbiter.token_holder(), Some(h[0]));

    assert!(arbiter.release_attack_permission(h[0]));
    assert_eq!(arbiter.token_holder(), None);

    // Stale release after the token moved on
    arbiter.request_attack_permission(h[1]);
    assert!(!arbiter.release_attack_permission(h[0]));
    assert_eq!(arbiter.token_holder(), Some(h[1]));
}

#[test]
fn test_unregister_clears_holder_token() {
    let h = handles(2);
    let mut arbiter = CombatArbiter::default();
    arbiter.register(h[0]);
    arbiter.register(h[1]);
    arbiter.request_attack_permission(h[0]);

    arbiter.unregister(h[0]);
    assert_eq!(arbiter.token_holder(), None);
    assert!(arbiter.request_attack_permission(h[1]));
}

#[test]
fn test_unregistered_or_dead_never_granted() {
    let h = handles(2);
    let mut arbiter = CombatArbiter::default();

    assert!(!arbiter.request_attack_permission(h[0]));

    arbiter.register(h[1]);
    arbiter.report_status(
        h[1],
        CombatantStatus {
            dead: true,
            ..Default::default()
        },
    );
    assert!(!arbiter.request_attack_permission(h[1]));
    assert_eq!(arbiter.token_holder(), None);
}

#[test]
fn test_dead_report_clears_token_synchronously() {
    let h = handles(1);
    let mut arbiter = CombatArbiter::default();
    arbiter.register(h[0]);
    arbiter.request_attack_permission(h[0]);

    arbiter.report_status(
        h[0],
        CombatantStatus {
            dead: true,
            ..Default::default()
        },
    );
    assert_eq!(arbiter.token_holder(), None);
}

#[test]
fn test_validate_sweeps_dead_entries() {
    let h = handles(3);
    let mut arbiter = arbiter_with_target();
    for handle in &h {
        arbiter.register(*handle);
    }
    arbiter.report_status(
        h[1],
        CombatantStatus {
            dead: true,
            ..Default::default()
        },
    );

    arbiter.validate();
    assert_eq!(arbiter.roster_len(), 2);
    assert!(!arbiter.is_registered(h[1]));
}

#[test]
fn test_circle_slots_spread_evenly() {
    let h = handles(3);
    let mut arbiter = arbiter_with_target();
    for handle in &h {
        arbiter.register(*handle);
    }
    arbiter.request_attack_permission(h[0]);

    // Waiting: h[1] (slot 0), h[2] (slot 1) → противоположные стороны круга
    let radius = arbiter.config().circle_radius;
    let p1 = arbiter.circle_position(h[1], Vec3::ONE);
    let p2 = arbiter.circle_position(h[2], Vec3::ONE);

    assert!((p1 - Vec3::new(radius, 0.0, 0.0)).length() < 1e-4);
    assert!((p2 - Vec3::new(-radius, 0.0, 0.0)).length() < 1e-3);
    assert!((p1.length() - radius).abs() < 1e-4);
}

#[test]
fn test_circle_returns_current_when_not_waiting() {
    let h = handles(2);
    let mut arbiter = arbiter_with_target();
    arbiter.register(h[0]);
    arbiter.request_attack_permission(h[0]);

    let current = Vec3::new(7.0, 0.0, 3.0);
    // Holder is not on the ring
    assert_eq!(arbiter.circle_position(h[0], current), current);
    // Unregistered handle
    assert_eq!(arbiter.circle_position(h[1], current), current);
}

#[test]
fn test_circle_without_target_returns_current() {
    let h = handles(1);
    let mut arbiter = CombatArbiter::default();
    arbiter.register(h[0]);

    let current = Vec3::new(1.0, 0.0, 1.0);
    assert_eq!(arbiter.circle_position(h[0], current), current);
}

#[test]
fn test_dead_combatant_leaves_ring_immediately() {
    let h = handles(3);
    let mut arbiter = arbiter_with_target();
    for handle in &h {
        arbiter.register(*handle);
    }

    assert_eq!(arbiter.waiting_count(), 3);
    arbiter.unregister(h[0]);
    assert_eq!(arbiter.waiting_count(), 2);

    // h[1] теперь slot 0 of 2
    let radius = arbiter.config().circle_radius;
    let p1 = arbiter.circle_position(h[1], Vec3::ZERO);
    assert!((p1 - Vec3::new(radius, 0.0, 0.0)).length() < 1e-4);
}

#[test]
fn test_ring_rotates_over_time() {
    let h = handles(1);
    let mut arbiter = arbiter_with_target();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    arbiter.register(h[0]);

    let before = arbiter.circle_position(h[0], Vec3::ZERO);
    arbiter.tick(1.0, &mut rng);
    let after = arbiter.circle_position(h[0], Vec3::ZERO);

    // 20°/s × 1s
    let expected = 20.0_f32.to_radians();
    let angle = after.z.atan2(after.x);
    assert!((angle - expected).abs() < 1e-3);
    assert!(before != after);
}

#[test]
fn test_opportunity_assigns_closest_engaged() {
    // A, B, C регистрируются по порядку; ближайший — C, не A
    let h = handles(3);
    let mut arbiter = arbiter_with_target();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for handle in &h {
        arbiter.register(*handle);
    }
    arbiter.report_status(h[0], engaged_at(Vec3::new(9.0, 0.0, 0.0)));
    arbiter.report_status(h[1], engaged_at(Vec3::new(6.0, 0.0, 0.0)));
    arbiter.report_status(h[2], engaged_at(Vec3::new(0.0, 0.0, 3.0)));

    arbiter.tick(0.016, &mut rng);
    assert_eq!(arbiter.token_holder(), Some(h[2]));
}

#[test]
fn test_opportunity_measures_on_ground_plane() {
    // A на уступе над целью: по земле ближе, в 3D дальше
    let h = handles(2);
    let mut arbiter = arbiter_with_target();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    arbiter.register(h[0]);
    arbiter.register(h[1]);
    arbiter.report_status(h[0], engaged_at(Vec3::new(0.0, 10.0, 2.0)));
    arbiter.report_status(h[1], engaged_at(Vec3::new(0.0, 0.0, 3.0)));

    arbiter.tick(0.016, &mut rng);
    assert_eq!(arbiter.token_holder(), Some(h[0]));
}

#[test]
fn test_opportunity_ignores_unengaged() {
    let h = handles(2);
    let mut arbiter = arbiter_with_target();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    arbiter.register(h[0]);
    arbiter.register(h[1]);
    arbiter.report_status(
        h[0],
        CombatantStatus {
            position: Vec3::new(1.0, 0.0, 0.0),
            engaged: false,
            ..Default::default()
        },
    );
    arbiter.report_status(h[1], engaged_at(Vec3::new(12.0, 0.0, 0.0)));

    arbiter.tick(0.016, &mut rng);
    assert_eq!(arbiter.token_holder(), Some(h[1]));
}

#[test]
fn test_opportunity_runs_on_interval_only() {
    let h = handles(1);
    let mut arbiter = arbiter_with_target();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    arbiter.register(h[0]);

    // Первый check на первом тике — никто не engaged
    arbiter.tick(0.1, &mut rng);
    arbiter.report_status(h[0], engaged_at(Vec3::new(2.0, 0.0, 0.0)));

    // 0.3s < interval 0.5s — не назначаем
    arbiter.tick(0.1, &mut rng);
    arbiter.tick(0.1, &mut rng);
    arbiter.tick(0.1, &mut rng);
    assert_eq!(arbiter.token_holder(), None);

    for _ in 0..3 {
        arbiter.tick(0.1, &mut rng);
    }
    assert_eq!(arbiter.token_holder(), Some(h[0]));
}

#[test]
fn test_vulnerable_holder_replaced_when_chance_hits() {
    let h = handles(3);
    let mut arbiter = CombatArbiter::new(ArbiterConfig {
        engage_chance: 1.0,
        ..Default::default()
    });
    arbiter.set_target(Some(Vec3::ZERO));
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for handle in &h {
        arbiter.register(*handle);
    }
    arbiter.request_attack_permission(h[0]);
    arbiter.report_status(
        h[0],
        CombatantStatus {
            position: Vec3::new(1.0, 0.0, 0.0),
            engaged: true,
            dead: false,
            vulnerable: true,
        },
    );
    arbiter.report_status(h[1], engaged_at(Vec3::new(8.0, 0.0, 0.0)));
    arbiter.report_status(h[2], engaged_at(Vec3::new(5.0, 0.0, 0.0)));

    arbiter.tick(0.016, &mut rng);
    assert_eq!(arbiter.token_holder(), Some(h[2]));
}

#[test]
fn test_vulnerable_holder_kept_when_chance_zero() {
    let h = handles(2);
    let mut arbiter = CombatArbiter::new(ArbiterConfig {
        engage_chance: 0.0,
        ..Default::default()
    });
    arbiter.set_target(Some(Vec3::ZERO));
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    arbiter.register(h[0]);
    arbiter.register(h[1]);
    arbiter.request_attack_permission(h[0]);
    arbiter.report_status(
        h[0],
        CombatantStatus {
            position: Vec3::new(1.0, 0.0, 0.0),
            engaged: true,
            dead: false,
            vulnerable: true,
        },
    );
    arbiter.report_status(h[1], engaged_at(Vec3::new(2.0, 0.0, 0.0)));

    for _ in 0..20 {
        arbiter.tick(0.1, &mut rng);
    }
    assert_eq!(arbiter.token_holder(), Some(h[0]));
}

#[test]
fn test_active_holder_never_revoked() {
    let h = handles(2);
    let mut arbiter = CombatArbiter::new(ArbiterConfig {
        engage_chance: 1.0,
        ..Default::default()
    });
    arbiter.set_target(Some(Vec3::ZERO));
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    arbiter.register(h[0]);
    arbiter.register(h[1]);
    arbiter.request_attack_permission(h[0]);
    arbiter.report_status(h[0], engaged_at(Vec3::new(9.0, 0.0, 0.0)));
    arbiter.report_status(h[1], engaged_at(Vec3::new(1.0, 0.0, 0.0)));

    for _ in 0..50 {
        arbiter.tick(0.1, &mut rng);
    }
    assert_eq!(arbiter.token_holder(), Some(h[0]));
}

#[test]
fn test_reset_discards_encounter_state() {
    let h = handles(2);
    let mut arbiter = arbiter_with_target();
    arbiter.register(h[0]);
    arbiter.register(h[1]);
    arbiter.request_attack_permission(h[0]);

    arbiter.reset();
    assert!(arbiter.is_empty());
    assert_eq!(arbiter.token_holder(), None);
    assert_eq!(arbiter.target(), None);
}

#[derive(Debug, Clone)]
enum Op {
    Register(usize),
    Unregister(usize),
    Request(usize),
    Release(usize),
    Report { who: usize, dead: bool, vulnerable: bool, distance: f32 },
    Tick(f32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..5usize).prop_map(Op::Register),
        (0..5usize).prop_map(Op::Unregister),
        (0..5usize).prop_map(Op::Request),
        (0..5usize).prop_map(Op::Release),
        (0..5usize, any::<bool>(), any::<bool>(), 0.0f32..20.0).prop_map(
            |(who, dead, vulnerable, distance)| Op::Report { who, dead, vulnerable, distance }
        ),
        (0.0f32..0.6).prop_map(Op::Tick),
    ]
}

proptest! {
    #[test]
    fn prop_token_holder_is_registered_and_alive(ops in proptest::collection::vec(op_strategy(), 1..80)) {
        let h = handles(5);
        let mut arbiter = CombatArbiter::new(ArbiterConfig { engage_chance: 0.7, ..Default::default() });
        arbiter.set_target(Some(Vec3::ZERO));
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut dead = [false; 5];

        for op in ops {
            match op {
                Op::Register(i) => {
                    // Мёртвые не возвращаются в roster
                    if !dead[i] {
                        arbiter.register(h[i]);
                    }
                }
                Op::Unregister(i) => {
                    arbiter.unregister(h[i]);
                }
                Op::Request(i) => {
                    let granted = arbiter.request_attack_permission(h[i]);
                    if granted {
                        prop_assert!(!dead[i]);
                    }
                }
                Op::Release(i) => {
                    let holder = arbiter.token_holder();
                    arbiter.release_attack_permission(h[i]);
                    if holder != Some(h[i]) {
                        prop_assert_eq!(arbiter.token_holder(), holder);
                    }
                }
                Op::Report { who, dead: is_dead, vulnerable, distance } => {
                    let is_dead = is_dead || dead[who];
                    dead[who] = is_dead;
                    arbiter.report_status(h[who], CombatantStatus {
                        position: Vec3::new(distance, 0.0, 0.0),
                        engaged: true,
                        dead: is_dead,
                        vulnerable,
                    });
                }
                Op::Tick(delta) => arbiter.tick(delta, &mut rng),
            }

            if let Some(holder) = arbiter.token_holder() {
                prop_assert!(arbiter.is_registered(holder));
                let index = h.iter().position(|e| *e == holder).unwrap_or(usize::MAX);
                prop_assert!(index < 5 && !dead[index]);
            }
        }
    }
}
