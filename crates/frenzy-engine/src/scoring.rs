use frenzy_core::question::Difficulty;

/// Base points for any correct answer.
pub const BASE_POINTS: f64 = 100.0;
/// Points per second of margin left before the deadline.
pub const TIME_BONUS_RATE: f64 = 10.0;
/// Classic mode ends when any score reaches this.
pub const CLASSIC_TARGET_SCORE: i32 = 10;
/// Speed mode ends after this much wall-clock time.
pub const SPEED_GAME_DURATION_SECS: u64 = 120;
/// Survival mode lives per game.
pub const SURVIVAL_LIVES: u32 = 3;
/// How long a freeze powerup disables the opponent's input.
pub const FREEZE_DURATION_MS: u64 = 5000;
/// Delay between answer resolution and the next question.
pub const ADVANCE_DELAY_MS: u64 = 3000;
/// Countdown tick granularity.
pub const COUNTDOWN_TICK_MS: u64 = 1000;

/// Points for one answer. Zero when incorrect; otherwise base points plus
/// a bonus for each second of margin before the deadline, scaled by the
/// difficulty multiplier. Minimum for a correct answer is
/// `BASE_POINTS * multiplier` at or past the deadline.
pub fn calculate_points(
    response_time_ms: u64,
    is_correct: bool,
    time_limit_secs: u32,
    difficulty: Difficulty,
) -> i32 {
    if !is_correct {
        return 0;
    }
    let limit_ms = u64::from(time_limit_secs) * 1000;
    let time_bonus = limit_ms.saturating_sub(response_time_ms) as f64 / 1000.0;
    ((BASE_POINTS + time_bonus * TIME_BONUS_RATE) * difficulty.multiplier()).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_answer_medium() {
        assert_eq!(calculate_points(0, true, 30, Difficulty::Medium), 600);
    }

    #[test]
    fn deadline_answer_medium() {
        assert_eq!(calculate_points(30_000, true, 30, Difficulty::Medium), 150);
    }

    #[test]
    fn past_deadline_clamps_to_base() {
        assert_eq!(calculate_points(45_000, true, 30, Difficulty::Medium), 150);
    }

    #[test]
    fn incorrect_scores_zero() {
        assert_eq!(calculate_points(0, false, 30, Difficulty::Hard), 0);
    }

    #[test]
    fn instant_answer_hard_short_limit() {
        assert_eq!(calculate_points(0, true, 20, Difficulty::Hard), 600);
    }

    #[test]
    fn easy_has_no_multiplier() {
        assert_eq!(calculate_points(10_000, true, 30, Difficulty::Easy), 300);
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            // Reward never increases with latency.
            #[test]
            fn points_decrease_with_response_time(
                fast in 0u64..60_000,
                delta in 0u64..60_000,
            ) {
                let slow = fast + delta;
                let p_fast = calculate_points(fast, true, 30, Difficulty::Medium);
                let p_slow = calculate_points(slow, true, 30, Difficulty::Medium);
                prop_assert!(p_fast >= p_slow);
            }

            // Correct answers always pay at least the base rate, and the
            // bonus is capped by the time limit.
            #[test]
            fn points_are_bounded(rt in 0u64..120_000, limit in 1u32..120) {
                for d in Difficulty::ALL {
                    let p = calculate_points(rt, true, limit, d);
                    let min = (BASE_POINTS * d.multiplier()).round() as i32;
                    let max = ((BASE_POINTS + f64::from(limit) * TIME_BONUS_RATE)
                        * d.multiplier())
                        .round() as i32;
                    prop_assert!(p >= min && p <= max);
                }
            }
        }
    }
}
