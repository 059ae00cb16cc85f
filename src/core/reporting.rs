use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::health::AT_RISK_THRESHOLD;
use crate::models::{Connection, ConnectionStatus};

const MESSAGE_WEIGHT: f64 = 0.20;
const SPEND_WEIGHT: f64 = 0.30;
const UNLOCK_WEIGHT: f64 = 0.20;
const RECENCY_WEIGHT: f64 = 0.20;
const TIP_WEIGHT: f64 = 0.10;

const MESSAGE_SATURATION: f64 = 100.0;
const SPEND_SATURATION: f64 = 500.0;
const UNLOCK_SATURATION: f64 = 20.0;
const RECENCY_WINDOW_DAYS: i64 = 7;

/// Composite relationship strength (0-100)
///
/// strength = (
///     min(messages / 100, 1) * 0.20 +
///     min(revenue / 500, 1)  * 0.30 +
///     min(unlocks / 20, 1)   * 0.20 +
///     active_last_7_days     * 0.20 +
///     has_tipped             * 0.10
/// ) * 100
pub fn relationship_strength(connection: &Connection, now: DateTime<Utc>) -> f64 {
    let engagement = &connection.engagement;

    let messages = (engagement.total_messages() as f64 / MESSAGE_SATURATION).min(1.0);
    let spend = (connection.monetization.total_revenue.max(0.0) / SPEND_SATURATION).min(1.0);
    let unlocks = (engagement.content_unlocks as f64 / UNLOCK_SATURATION).min(1.0);
    let recent = engagement
        .last_active_at
        .map(|at| now.signed_duration_since(at) < Duration::days(RECENCY_WINDOW_DAYS))
        .unwrap_or(false);
    let recency = if recent { 1.0 } else { 0.0 };
    let tips = if engagement.tip_count > 0 { 1.0 } else { 0.0 };

    let strength = messages * MESSAGE_WEIGHT
        + spend * SPEND_WEIGHT
        + unlocks * UNLOCK_WEIGHT
        + recency * RECENCY_WEIGHT
        + tips * TIP_WEIGHT;

    (strength * 100.0).clamp(0.0, 100.0)
}

/// Sort by net revenue (descending) and keep the first `limit`
pub fn top_spenders(mut connections: Vec<Connection>, limit: usize) -> Vec<Connection> {
    connections.sort_by(|a, b| {
        b.monetization
            .total_revenue
            .partial_cmp(&a.monetization.total_revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.member_id.cmp(&b.member_id))
    });
    connections.truncate(limit);
    connections
}

/// A live connection whose churn risk has reached the at-risk threshold.
/// Pending, disconnected and blocked records never count.
#[inline]
pub fn is_at_risk(connection: &Connection) -> bool {
    connection.status == ConnectionStatus::Connected
        && connection.relationship.health.churn_risk >= AT_RISK_THRESHOLD
}

/// Connected records at or above the at-risk churn threshold, riskiest first
pub fn at_risk(connections: Vec<Connection>) -> Vec<Connection> {
    let mut risky: Vec<Connection> = connections.into_iter().filter(is_at_risk).collect();
    risky.sort_by(|a, b| {
        b.relationship
            .health
            .churn_risk
            .cmp(&a.relationship.health.churn_risk)
            .then_with(|| {
                b.relationship
                    .health
                    .days_since_last_interaction
                    .cmp(&a.relationship.health.days_since_last_interaction)
            })
    });
    risky
}

/// Per-creator dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorStats {
    pub creator_id: String,
    pub total: usize,
    pub pending: usize,
    pub connected: usize,
    pub disconnected: usize,
    pub blocked: usize,
    pub total_revenue: f64,
    pub at_risk: usize,
}

pub fn creator_stats(creator_id: &str, connections: &[Connection]) -> CreatorStats {
    let mut stats = CreatorStats {
        creator_id: creator_id.to_string(),
        ..Default::default()
    };

    for connection in connections {
        stats.total += 1;
        match connection.status {
            ConnectionStatus::Pending => stats.pending += 1,
            ConnectionStatus::Connected => stats.connected += 1,
            ConnectionStatus::Disconnected => stats.disconnected += 1,
            ConnectionStatus::Blocked => stats.blocked += 1,
        }
        stats.total_revenue += connection.monetization.total_revenue;
        if is_at_risk(connection) {
            stats.at_risk += 1;
        }
    }

    stats
}
