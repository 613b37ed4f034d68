//! Property tests for the experience curve

use proptest::prelude::*;

use wizard_math::consts::START_EXP_TO_NEXT_LEVEL;
use wizard_math::sim::PlayerState;

/// Level reached with `total` EXP, counting thresholds 3, 7, 12, 18, 25, ...
fn level_for_total(total: u32) -> u32 {
    let mut level = 1;
    let mut need = START_EXP_TO_NEXT_LEVEL;
    let mut spent = 0;
    while spent + need <= total {
        spent += need;
        level += 1;
        need += level + 2;
    }
    level
}

#[test]
fn reference_curve_matches_listed_thresholds() {
    let levels: Vec<u32> = [2, 3, 9, 10, 21, 22, 39, 40, 64, 65]
        .into_iter()
        .map(level_for_total)
        .collect();
    assert_eq!(levels, vec![1, 2, 2, 3, 3, 4, 4, 5, 5, 6]);
}

proptest! {
    #[test]
    fn level_counts_threshold_crossings(grants in prop::collection::vec(0u32..40, 0..30)) {
        let mut player = PlayerState::new();
        let mut total = 0;

        for amount in grants {
            let before = level_for_total(total);
            total += amount;
            let crossings = level_for_total(total) - before;

            let gained = player.gain_exp(amount);
            prop_assert_eq!(gained, crossings);
            prop_assert_eq!(player.level, level_for_total(total));
            prop_assert!(player.exp < player.exp_to_next_level);
            prop_assert_eq!(player.pending_upgrades(), gained);

            while player.select_upgrade() {}
            prop_assert_eq!(player.pending_upgrades(), 0);
        }
        prop_assert_eq!(player.ice.level, player.level - 1);
    }

    #[test]
    fn grants_during_pending_choice_are_dropped(first in 3u32..40, second in 0u32..40) {
        let mut player = PlayerState::new();
        player.gain_exp(first);
        let (level, exp) = (player.level, player.exp);

        prop_assert_eq!(player.gain_exp(second), 0);
        prop_assert_eq!(player.level, level);
        prop_assert_eq!(player.exp, exp);
    }
}
