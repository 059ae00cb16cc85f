use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::health;
use crate::error::ConnectionError;
use crate::models::{
    Connection, ConnectionStatus, Party, Purchase, PurchaseFrequency, PurchaseKind, Refund,
    SpendingTier,
};

/// Engagement signal delivered by the messaging and payment collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngagementEvent {
    MessageSent {
        sender: Party,
    },
    ContentUnlocked {
        price: f64,
        #[serde(rename = "contentId", default)]
        content_id: Option<String>,
    },
    DmPurchased {
        price: f64,
    },
    TipSent {
        amount: f64,
    },
}

impl EngagementEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessageSent { .. } => "message_sent",
            Self::ContentUnlocked { .. } => "content_unlocked",
            Self::DmPurchased { .. } => "dm_purchased",
            Self::TipSent { .. } => "tip_sent",
        }
    }
}

fn validate_amount(amount: f64) -> Result<f64, ConnectionError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ConnectionError::InvalidInput(format!(
            "amount must be a positive number, got {}",
            amount
        )));
    }
    Ok(amount)
}

/// Apply an engagement event to a connection, then recompute derived scores
///
/// Returns the id of the itemized purchase for monetary events.
pub fn apply_event(
    connection: &mut Connection,
    event: &EngagementEvent,
    now: DateTime<Utc>,
) -> Result<Option<Uuid>, ConnectionError> {
    match connection.status {
        ConnectionStatus::Pending => {
            return Err(ConnectionError::InvalidState(format!(
                "connection {} has not been established",
                connection.id
            )));
        }
        ConnectionStatus::Connected => {}
        ConnectionStatus::Disconnected | ConnectionStatus::Blocked => {
            // Messaging is gated on the connection; payments already captured still count
            if matches!(event, EngagementEvent::MessageSent { .. }) {
                return Err(ConnectionError::InvalidState(format!(
                    "connection {} is {}",
                    connection.id,
                    connection.status.as_str()
                )));
            }
        }
    }

    let purchase_id = match event {
        EngagementEvent::MessageSent { sender } => {
            record_message(connection, *sender, now);
            None
        }
        EngagementEvent::ContentUnlocked { price, content_id } => {
            let price = validate_amount(*price)?;
            let engagement = &mut connection.engagement;
            engagement.content_unlocks += 1;
            engagement.unlock_spend += price;
            Some(record_purchase(connection, PurchaseKind::ContentUnlock, price, content_id.clone(), now))
        }
        EngagementEvent::DmPurchased { price } => {
            let price = validate_amount(*price)?;
            let engagement = &mut connection.engagement;
            engagement.dm_purchases += 1;
            engagement.dm_spend += price;
            engagement.avg_dm_price = engagement.dm_spend / engagement.dm_purchases as f64;
            Some(record_purchase(connection, PurchaseKind::Dm, price, None, now))
        }
        EngagementEvent::TipSent { amount } => {
            let amount = validate_amount(*amount)?;
            let engagement = &mut connection.engagement;
            engagement.tip_count += 1;
            engagement.tip_total += amount;
            engagement.largest_tip = engagement.largest_tip.max(amount);
            Some(record_purchase(connection, PurchaseKind::Tip, amount, None, now))
        }
    };

    connection.engagement.last_active_at = Some(now);
    recompute_scores(connection, now);
    health::refresh(connection, now);

    Ok(purchase_id)
}

fn record_message(connection: &mut Connection, sender: Party, now: DateTime<Utc>) {
    let engagement = &mut connection.engagement;
    match sender {
        Party::Member => engagement.messages_from_member += 1,
        Party::Creator => {
            engagement.messages_from_creator += 1;

            // A creator message right after a member message counts as a reply
            if let (Some(Party::Member), Some(previous)) =
                (engagement.last_message_from, engagement.last_message_at)
            {
                let minutes = now.signed_duration_since(previous).num_seconds().max(0) as f64 / 60.0;
                let replies = engagement.creator_replies as f64;
                let creator_score = &mut connection.relationship.creator;
                let avg = creator_score.avg_response_time_mins.unwrap_or(0.0);
                creator_score.avg_response_time_mins = Some((avg * replies + minutes) / (replies + 1.0));
                engagement.creator_replies += 1;
            }
        }
    }
    engagement.last_message_at = Some(now);
    engagement.last_message_from = Some(sender);

    if engagement.messages_from_member > 0 {
        let rate = engagement.creator_replies as f64 / engagement.messages_from_member as f64 * 100.0;
        connection.relationship.creator.response_rate = rate.min(100.0).round() as u8;
    }
}

fn record_purchase(
    connection: &mut Connection,
    kind: PurchaseKind,
    amount: f64,
    reference: Option<String>,
    now: DateTime<Utc>,
) -> Uuid {
    let id = Uuid::new_v4();
    connection.monetization.purchases.push(Purchase {
        id,
        kind,
        amount,
        reference,
        purchased_at: now,
        refunded_amount: 0.0,
    });
    connection.monetization.total_revenue += amount;
    id
}

/// Reverse all or part of an itemized purchase.
///
/// Counters stay untouched; only revenue moves and the refund is kept in the
/// ledger next to the purchase it reverses.
pub fn apply_refund(
    connection: &mut Connection,
    purchase_id: Uuid,
    amount: f64,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<Refund, ConnectionError> {
    let amount = validate_amount(amount)?;

    let purchase = connection
        .monetization
        .purchases
        .iter_mut()
        .find(|p| p.id == purchase_id)
        .ok_or_else(|| ConnectionError::NotFound(format!("purchase {}", purchase_id)))?;

    let refundable = purchase.refundable();
    if refundable <= 0.0 {
        return Err(ConnectionError::InvalidInput(format!(
            "purchase {} has already been refunded",
            purchase_id
        )));
    }
    if amount > refundable + f64::EPSILON {
        return Err(ConnectionError::InvalidInput(format!(
            "refund of {:.2} exceeds refundable amount {:.2}",
            amount, refundable
        )));
    }

    purchase.refunded_amount += amount;

    let refund = Refund {
        id: Uuid::new_v4(),
        purchase_id,
        amount,
        reason: reason.to_string(),
        refunded_at: now,
    };

    let monetization = &mut connection.monetization;
    monetization.refunds.push(refund.clone());
    monetization.total_revenue = (monetization.total_revenue - amount).max(0.0);
    monetization.refunded_total += amount;

    recompute_scores(connection, now);
    health::refresh(connection, now);

    Ok(refund)
}

/// Spending tier by net revenue from the member
pub fn spending_tier(total_revenue: f64) -> SpendingTier {
    match total_revenue {
        r if r <= 0.0 => SpendingTier::None,
        r if r < 50.0 => SpendingTier::Low,
        r if r < 200.0 => SpendingTier::Medium,
        r if r < 1000.0 => SpendingTier::High,
        _ => SpendingTier::Whale,
    }
}

/// Purchase frequency class from purchase count and relationship tenure
pub fn purchase_frequency(purchases: usize, tenure_days: i64) -> PurchaseFrequency {
    match purchases {
        0 => PurchaseFrequency::None,
        1 => PurchaseFrequency::OneTime,
        n => {
            let months = (tenure_days.max(1) as f64 / 30.0).max(1.0);
            let per_month = n as f64 / months;
            if per_month < 2.0 {
                PurchaseFrequency::Occasional
            } else if per_month < 5.0 {
                PurchaseFrequency::Regular
            } else {
                PurchaseFrequency::Frequent
            }
        }
    }
}

/// Recompute monetization aggregates and the member score
pub fn recompute_scores(connection: &mut Connection, now: DateTime<Utc>) {
    let since = connection.connected_at.unwrap_or(connection.created_at);
    let tenure_days = now.signed_duration_since(since).num_days().max(0);

    let monetization = &mut connection.monetization;
    let active = monetization
        .purchases
        .iter()
        .filter(|p| p.refundable() > 0.0)
        .count();
    monetization.avg_transaction_value = if active > 0 {
        monetization.total_revenue / active as f64
    } else {
        0.0
    };
    monetization.purchase_frequency = purchase_frequency(active, tenure_days);

    let engagement = &connection.engagement;
    let interactions = engagement.messages_from_member
        + 5 * (engagement.content_unlocks + engagement.dm_purchases + engagement.tip_count);

    let member_score = &mut connection.relationship.member;
    member_score.engagement_level = interactions.min(100) as u8;
    member_score.spending_tier = spending_tier(monetization.total_revenue);
    member_score.loyalty_score = (tenure_days as u64 / 2 + active as u64 * 2).min(100) as u8;
}
