use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::core::filters::{orientation_compatible, shared_interests};
use crate::models::{CompatibilityFactors, CompatibilityScore, CreatorProfile, MemberProfile};

const BASE_SCORE: u8 = 50;
const ORIENTATION_BONUS: u8 = 30;
const PER_SHARED_INTEREST: u32 = 5;
const CLOSE_AGE_BONUS: u8 = 10;
const NEAR_AGE_BONUS: u8 = 5;

/// Window in which a creator counts as "currently active"
pub const ACTIVE_WINDOW_MINS: i64 = 15;
const ACTIVITY_BONUS: f64 = 20.0;
const MAX_NOISE: f64 = 10.0;
const MAX_PREDICTION: f64 = 95.0;

/// Calculate a compatibility score (0-100) for a member/creator pair
///
/// Scoring formula:
/// score = min(100,
///     50 +                         # base
///     30 * orientation_match +     # member orientation accepts creator gender
///     5 * shared_interests +       # case-insensitive overlap
///     age_bonus                    # +10 under 5 years apart, +5 under 10
/// )
pub fn compatibility(member: &MemberProfile, creator: &CreatorProfile) -> CompatibilityScore {
    let orientation_match = if orientation_compatible(member, creator) {
        ORIENTATION_BONUS
    } else {
        0
    };

    let shared = shared_interests(member, creator).len() as u32;
    let interest_points = (shared * PER_SHARED_INTEREST).min(100) as u8;

    let age_proximity = match (member.age, creator.age) {
        (Some(a), Some(b)) => {
            let gap = a.abs_diff(b);
            if gap < 5 {
                CLOSE_AGE_BONUS
            } else if gap < 10 {
                NEAR_AGE_BONUS
            } else {
                0
            }
        }
        _ => 0,
    };

    let factors = CompatibilityFactors {
        base: BASE_SCORE,
        orientation_match,
        shared_interests: interest_points,
        age_proximity,
    };

    let total = BASE_SCORE as u32
        + orientation_match as u32
        + interest_points as u32
        + age_proximity as u32;

    CompatibilityScore {
        score: total.min(100) as u8,
        factors,
    }
}

/// Predict the chance (0-95) that a right swipe turns into a connection
///
/// prediction = min(95, compatibility * 0.7 + activity_bonus + noise)
/// where activity_bonus is 20 for creators active in the last 15 minutes and
/// noise is drawn uniformly from [0, 10) using the supplied generator.
pub fn connection_success_prediction<R: Rng + ?Sized>(
    member: &MemberProfile,
    creator: &CreatorProfile,
    now: DateTime<Utc>,
    rng: &mut R,
) -> u8 {
    let compat = compatibility(member, creator).score as f64;
    let activity_bonus = if creator.active_within(now, Duration::minutes(ACTIVE_WINDOW_MINS)) {
        ACTIVITY_BONUS
    } else {
        0.0
    };
    let noise = rng.gen_range(0.0..MAX_NOISE);

    (compat * 0.7 + activity_bonus + noise).min(MAX_PREDICTION).round() as u8
}
