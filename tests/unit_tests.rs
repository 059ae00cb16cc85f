// Unit tests for Lume Connect

use chrono::{Duration, Utc};
use lume_connect::core::{
    compatibility, connection_success_prediction,
    engagement::{apply_event, spending_tier, EngagementEvent},
    health::{classify, compute},
    ranker::weighted_shuffle,
    relationship_strength,
    swipe::{apply_member_swipe, new_direct_connection},
    DiscoveryRanker, MemberSwipeInput, SwipeOutcome,
};
use lume_connect::models::{
    BrowseFilters, Connection, ConnectionStatus, CreatorProfile, Decision, HealthStatus, MemberProfile,
    Orientation, SpendingTier,
};
use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashSet;

fn create_test_creator(id: &str, age: u8, interests: &[&str]) -> CreatorProfile {
    CreatorProfile {
        creator_id: id.to_string(),
        display_name: format!("Creator {}", id),
        gender: "female".to_string(),
        orientation: Orientation::Straight,
        age: Some(age),
        body_type: Some("curvy".to_string()),
        ethnicity: Some("latina".to_string()),
        interests: interests.iter().map(|s| s.to_string()).collect(),
        is_active: true,
        is_browsable: true,
        is_verified: Some(false),
        auto_connect_enabled: false,
        last_active: None,
        last_content_at: None,
    }
}

fn create_test_member() -> MemberProfile {
    MemberProfile {
        member_id: "member_1".to_string(),
        gender: "male".to_string(),
        orientation: Orientation::Straight,
        age: Some(30),
        interests: vec!["Gaming".to_string(), "cooking".to_string(), "hiking".to_string()],
    }
}

#[test]
fn test_compatibility_full_breakdown() {
    let member = create_test_member();
    let creator = create_test_creator("c1", 32, &["gaming", "Cooking", "art"]);

    let result = compatibility(&member, &creator);

    // 50 base + 30 orientation + 2 * 5 interests + 10 age
    assert_eq!(result.score, 100);
    assert_eq!(result.factors.orientation_match, 30);
    assert_eq!(result.factors.shared_interests, 10);
    assert_eq!(result.factors.age_proximity, 10);
}

#[test]
fn test_compatibility_incompatible_orientation() {
    let member = create_test_member();
    let mut creator = create_test_creator("c1", 45, &[]);
    creator.gender = "male".to_string();

    let result = compatibility(&member, &creator);
    assert_eq!(result.score, 50);
    assert_eq!(result.factors.orientation_match, 0);
    assert_eq!(result.factors.age_proximity, 0);
}

#[test]
fn test_compatibility_is_deterministic() {
    let member = create_test_member();
    let creator = create_test_creator("c1", 36, &["hiking"]);

    let first = compatibility(&member, &creator);
    for _ in 0..10 {
        assert_eq!(compatibility(&member, &creator), first);
    }
}

#[test]
fn test_prediction_bounded() {
    let member = create_test_member();
    let mut creator = create_test_creator("c1", 31, &["gaming", "cooking", "hiking"]);
    creator.last_active = Some(Utc::now() - Duration::minutes(2));
    let mut rng = StdRng::seed_from_u64(1);

    for _ in 0..100 {
        let prediction = connection_success_prediction(&member, &creator, Utc::now(), &mut rng);
        assert!(prediction <= 95);
        assert!(prediction >= 90);
    }
}

#[test]
fn test_health_decays_monotonically() {
    let mut previous = classify(0).1;
    for days in 1..120 {
        let (_, churn) = classify(days);
        assert!(churn >= previous, "churn dropped at day {}", days);
        previous = churn;
    }
    assert_eq!(classify(10), (HealthStatus::Cooling, 40));
    assert_eq!(classify(45), (HealthStatus::AtRisk, 90));
}

#[test]
fn test_health_compute_ignores_future_activity() {
    let now = Utc::now();
    let mut connection = new_direct_connection("c1", "m1", now);
    connection.engagement.last_active_at = Some(now + Duration::hours(3));

    let snapshot = compute(&connection, now);
    assert_eq!(snapshot.days_since_last_interaction, 0);
    assert_eq!(snapshot.status, HealthStatus::Thriving);
}

#[test]
fn test_spending_tiers() {
    assert_eq!(spending_tier(0.0), SpendingTier::None);
    assert_eq!(spending_tier(10.0), SpendingTier::Low);
    assert_eq!(spending_tier(75.0), SpendingTier::Medium);
    assert_eq!(spending_tier(500.0), SpendingTier::High);
    assert_eq!(spending_tier(2500.0), SpendingTier::Whale);
}

#[test]
fn test_invalid_amounts_rejected() {
    let now = Utc::now();
    let mut connection = new_direct_connection("c1", "m1", now);
    let before = connection.clone();

    for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        assert!(apply_event(&mut connection, &EngagementEvent::TipSent { amount }, now).is_err());
    }
    assert_eq!(connection, before);
}

#[test]
fn test_strength_saturates_at_100() {
    let now = Utc::now();
    let mut connection = new_direct_connection("c1", "m1", now);
    connection.engagement.messages_from_member = 400;
    connection.engagement.content_unlocks = 50;
    connection.engagement.tip_count = 3;
    connection.engagement.last_active_at = Some(now);
    connection.monetization.total_revenue = 5_000.0;

    assert!((relationship_strength(&connection, now) - 100.0).abs() < 1e-9);

    let idle = Connection::new("c2", "m2", now);
    assert_eq!(relationship_strength(&idle, now), 0.0);
}

#[test]
fn test_left_swipe_keeps_record_pending() {
    let now = Utc::now();
    let mut connection = Connection::new("c1", "m1", now);

    let outcome = apply_member_swipe(&mut connection, &MemberSwipeInput::new(Decision::Left, false), true, now).unwrap();

    assert_eq!(outcome, SwipeOutcome::Passed);
    assert_eq!(connection.status, ConnectionStatus::Pending);
    assert!(connection.connected_at.is_none());
}

#[test]
fn test_weighted_shuffle_keeps_every_item() {
    let items: Vec<u32> = (0..50).collect();
    let mut rng = StdRng::seed_from_u64(99);

    let mut shuffled = weighted_shuffle(items.clone(), 0.7, 5, &mut rng);
    shuffled.sort_unstable();
    assert_eq!(shuffled, items);
}

#[test]
fn test_weighted_shuffle_certain_top_pick_is_identity() {
    let items: Vec<u32> = (0..20).collect();
    let mut rng = StdRng::seed_from_u64(5);

    assert_eq!(weighted_shuffle(items.clone(), 1.0, 5, &mut rng), items);
}

#[test]
fn test_ranker_prefers_boosted_creators() {
    let ranker = DiscoveryRanker::with_default_params();
    let member = create_test_member();
    let now = Utc::now();

    let mut candidates: Vec<CreatorProfile> = (0..30)
        .map(|i| create_test_creator(&format!("plain_{:02}", i), 28, &[]))
        .collect();
    let mut star = create_test_creator("star", 28, &[]);
    star.is_verified = Some(true);
    star.last_active = Some(now - Duration::minutes(1));
    star.last_content_at = Some(now - Duration::days(1));
    candidates.push(star);

    // 120 points of bonuses against at most 20 of noise; the star wins the
    // sort and is popped within a few draws
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let stack = ranker.build_stack(
            &member,
            &BrowseFilters::default(),
            candidates.clone(),
            &HashSet::new(),
            now,
            &mut rng,
        );
        let position = stack.creators.iter().position(|c| c.creator_id == "star");
        assert!(position.map_or(false, |p| p < 10), "seed {} put star at {:?}", seed, position);
    }
}
