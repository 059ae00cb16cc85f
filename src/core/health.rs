use chrono::{DateTime, Duration, Utc};

use crate::models::{Connection, HealthSnapshot, HealthStatus};

/// Map days since last activity onto a health status and churn risk
///
/// | days   | status   | churn |
/// |--------|----------|-------|
/// | < 3    | thriving | 0     |
/// | 3..=6  | active   | 10    |
/// | 7..=13 | cooling  | 40    |
/// | 14..=29| dormant  | 70    |
/// | >= 30  | at_risk  | 90    |
#[inline]
pub fn classify(days_since_active: i64) -> (HealthStatus, u8) {
    match days_since_active {
        d if d < 3 => (HealthStatus::Thriving, 0),
        d if d < 7 => (HealthStatus::Active, 10),
        d if d < 14 => (HealthStatus::Cooling, 40),
        d if d < 30 => (HealthStatus::Dormant, 70),
        _ => (HealthStatus::AtRisk, 90),
    }
}

/// Churn risk at or above which a connection is reported as at risk
pub const AT_RISK_THRESHOLD: u8 = 70;

/// Last moment either party interacted, falling back to when the pair connected
pub fn last_interaction(connection: &Connection) -> DateTime<Utc> {
    connection
        .engagement
        .last_active_at
        .or(connection.connected_at)
        .unwrap_or(connection.created_at)
}

/// Compute a fresh health snapshot for a connection
pub fn compute(connection: &Connection, now: DateTime<Utc>) -> HealthSnapshot {
    // Clock skew can put last activity slightly in the future
    let days = now.signed_duration_since(last_interaction(connection)).num_days().max(0);
    let (status, churn_risk) = classify(days);

    HealthSnapshot {
        status,
        churn_risk,
        days_since_last_interaction: days,
        computed_at: now,
    }
}

/// Recompute the cached health fields in place
pub fn refresh(connection: &mut Connection, now: DateTime<Utc>) {
    connection.relationship.health = compute(connection, now);
}

/// Whether the cached health snapshot is older than the freshness window
pub fn is_stale(connection: &Connection, now: DateTime<Utc>, freshness: Duration) -> bool {
    now.signed_duration_since(connection.relationship.health.computed_at) > freshness
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(classify(0), (HealthStatus::Thriving, 0));
        assert_eq!(classify(2), (HealthStatus::Thriving, 0));
        assert_eq!(classify(3), (HealthStatus::Active, 10));
        assert_eq!(classify(6), (HealthStatus::Active, 10));
        assert_eq!(classify(7), (HealthStatus::Cooling, 40));
        assert_eq!(classify(13), (HealthStatus::Cooling, 40));
        assert_eq!(classify(14), (HealthStatus::Dormant, 70));
        assert_eq!(classify(29), (HealthStatus::Dormant, 70));
        assert_eq!(classify(30), (HealthStatus::AtRisk, 90));
        assert_eq!(classify(365), (HealthStatus::AtRisk, 90));
    }

    #[test]
    fn test_health_decay_is_monotonic() {
        let mut previous = classify(0);
        for days in 1..120 {
            let current = classify(days);
            assert!(current.1 >= previous.1, "churn risk dropped at day {}", days);
            assert!(current.0 >= previous.0, "status improved at day {}", days);
            previous = current;
        }
    }

    #[test]
    fn test_compute_uses_last_activity() {
        let now = Utc::now();
        let mut connection = Connection::new("c1", "m1", now - Duration::days(60));
        connection.engagement.last_active_at = Some(now - Duration::days(15));

        let snapshot = compute(&connection, now);
        assert_eq!(snapshot.status, HealthStatus::Dormant);
        assert_eq!(snapshot.churn_risk, 70);
        assert_eq!(snapshot.days_since_last_interaction, 15);
    }

    #[test]
    fn test_compute_falls_back_to_creation() {
        let now = Utc::now();
        let connection = Connection::new("c1", "m1", now - Duration::days(40));

        assert_eq!(compute(&connection, now).status, HealthStatus::AtRisk);
    }

    #[test]
    fn test_staleness() {
        let now = Utc::now();
        let mut connection = Connection::new("c1", "m1", now);
        assert!(!is_stale(&connection, now, Duration::hours(1)));

        connection.relationship.health.computed_at = now - Duration::hours(2);
        assert!(is_stale(&connection, now, Duration::hours(1)));
    }
}
