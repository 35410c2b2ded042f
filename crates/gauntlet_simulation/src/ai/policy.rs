//! Decision policy: distance + one roll → action.
//!
//! Role independent: всё что отличает Basic от Elite лежит в `DecisionProfile`
//! (дистанции, шанс re-charge, полосы вероятностей).

use rand::{Rng, RngCore};

use crate::combat::AttackKind;
use crate::config::{ActionBand, BandAction, DecisionProfile};

/// Action chosen by the policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Hold block for `duration` seconds
    Block { duration: f32 },
    Attack(AttackKind),
    /// Medium-range re-charge
    Charge,
    /// Nothing this round (keep closing distance)
    Hold,
}

/// Picks the band containing `roll` by cumulative weight.
///
/// Roll past the last band (weights summing below 1) selects nothing.
pub fn select_band(bands: &[ActionBand], roll: f32) -> Option<BandAction> {
    let mut cumulative = 0.0;
    for band in bands {
        cumulative += band.weight;
        if roll < cumulative {
            return Some(band.action);
        }
    }
    None
}

/// Next decision delay: `interval ± jitter`.
pub fn next_decision_interval(profile: &DecisionProfile, rng: &mut dyn RngCore) -> f32 {
    if profile.decision_jitter <= 0.0 {
        return profile.decision_interval;
    }
    let jitter = rng.gen_range(-profile.decision_jitter..=profile.decision_jitter);
    (profile.decision_interval + jitter).max(0.0)
}

/// Chooses an action given the live distance to the target.
pub fn decide(profile: &DecisionProfile, distance: f32, rng: &mut dyn RngCore) -> Decision {
    if distance <= profile.attack_distance {
        let roll: f32 = rng.gen();
        return match select_band(&profile.bands, roll) {
            Some(BandAction::Block) => Decision::Block {
                duration: block_duration(profile, rng),
            },
            Some(BandAction::Attack(kind)) => Decision::Attack(kind),
            None => Decision::Hold,
        };
    }

    let medium_range_start = profile.attack_distance + profile.charge_gap;
    if distance > medium_range_start && distance <= profile.charge_distance {
        if rng.gen::<f32>() < profile.charge_chance {
            return Decision::Charge;
        }
    }

    Decision::Hold
}

fn block_duration(profile: &DecisionProfile, rng: &mut dyn RngCore) -> f32 {
    if profile.block_max > profile.block_min {
        rng.gen_range(profile.block_min..=profile.block_max)
    } else {
        profile.block_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoleProfile;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_select_band_cumulative() {
        let bands = RoleProfile::basic().decision.bands;
        // Block 0.25 | Light 0.30 | Heavy 0.45
        assert_eq!(select_band(&bands, 0.0), Some(BandAction::Block));
        assert_eq!(select_band(&bands, 0.24), Some(BandAction::Block));
        assert_eq!(select_band(&bands, 0.25), Some(BandAction::Attack(AttackKind::Light)));
        assert_eq!(select_band(&bands, 0.54), Some(BandAction::Attack(AttackKind::Light)));
        assert_eq!(select_band(&bands, 0.56), Some(BandAction::Attack(AttackKind::Heavy)));
        assert_eq!(select_band(&bands, 0.999), Some(BandAction::Attack(AttackKind::Heavy)));
    }

    #[test]
    fn test_select_band_past_last_is_none() {
        let bands = vec![ActionBand {
            weight: 0.5,
            action: BandAction::Block,
        }];
        assert_eq!(select_band(&bands, 0.7), None);
        assert_eq!(select_band(&[], 0.1), None);
    }

    #[test]
    fn test_elite_bands_reach_combo_actions() {
        let bands = RoleProfile::elite().decision.bands;
        // Block 0.30 | Light 0.05 | Heavy 0.15 | Unblockable 0.20 | LegSweep 0.15 | SwordSlam 0.15
        assert_eq!(select_band(&bands, 0.60), Some(BandAction::Attack(AttackKind::Unblockable)));
        assert_eq!(select_band(&bands, 0.75), Some(BandAction::Attack(AttackKind::LegSweep)));
        assert_eq!(select_band(&bands, 0.90), Some(BandAction::Attack(AttackKind::SwordSlam)));
    }

    #[test]
    fn test_decide_dead_zone_holds() {
        let profile = RoleProfile::basic().decision;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // attack 2.5, gap 1.5 → (2.5, 4.0] ничего не делаем
        for _ in 0..100 {
            assert_eq!(decide(&profile, 3.5, &mut rng), Decision::Hold);
        }
        // За пределами charge distance — тоже ничего
        for _ in 0..100 {
            assert_eq!(decide(&profile, 20.0, &mut rng), Decision::Hold);
        }
    }

    #[test]
    fn test_decide_medium_range_charge_chance() {
        let mut profile = RoleProfile::basic().decision;
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        profile.charge_chance = 1.0;
        assert_eq!(decide(&profile, 6.0, &mut rng), Decision::Charge);

        profile.charge_chance = 0.0;
        for _ in 0..100 {
            assert_eq!(decide(&profile, 6.0, &mut rng), Decision::Hold);
        }
    }

    #[test]
    fn test_decide_block_duration_in_window() {
        let mut profile = RoleProfile::basic().decision;
        profile.bands = vec![ActionBand {
            weight: 1.0,
            action: BandAction::Block,
        }];
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        for _ in 0..100 {
            match decide(&profile, 1.0, &mut rng) {
                Decision::Block { duration } => {
                    assert!(duration >= profile.block_min && duration <= profile.block_max);
                }
                other => panic!("expected block, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_decision_interval_jitter_bounds() {
        let profile = RoleProfile::basic().decision;
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        for _ in 0..100 {
            let interval = next_decision_interval(&profile, &mut rng);
            assert!(interval >= profile.decision_interval - profile.decision_jitter - 1e-6);
            assert!(interval <= profile.decision_interval + profile.decision_jitter + 1e-6);
        }
    }
}
