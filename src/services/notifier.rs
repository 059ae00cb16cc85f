use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::models::{Connection, ConnectionSource};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification channel closed")]
    ChannelClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalPriority {
    Normal,
    High,
}

/// Signals handed to the notification collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum ConnectionSignal {
    /// A member liked a creator who has not answered yet
    LikeReceived {
        connection_id: Uuid,
        creator_id: String,
        member_id: String,
        priority: SignalPriority,
    },
    /// Fired once per transition into `connected`
    ConnectionEstablished {
        connection_id: Uuid,
        creator_id: String,
        member_id: String,
        source: ConnectionSource,
        notify_member: bool,
        notify_creator: bool,
    },
}

impl ConnectionSignal {
    pub fn like_received(connection: &Connection, super_like: bool) -> Self {
        ConnectionSignal::LikeReceived {
            connection_id: connection.id,
            creator_id: connection.creator_id.clone(),
            member_id: connection.member_id.clone(),
            priority: if super_like { SignalPriority::High } else { SignalPriority::Normal },
        }
    }

    pub fn connection_established(connection: &Connection) -> Self {
        ConnectionSignal::ConnectionEstablished {
            connection_id: connection.id,
            creator_id: connection.creator_id.clone(),
            member_id: connection.member_id.clone(),
            source: connection.source,
            notify_member: !connection.notifications.member.muted,
            notify_creator: !connection.notifications.creator.muted,
        }
    }
}

/// Sink for engine signals
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, signal: ConnectionSignal) -> Result<(), NotifyError>;
}

/// Notifier that only logs signals
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, signal: ConnectionSignal) -> Result<(), NotifyError> {
        match &signal {
            ConnectionSignal::LikeReceived { connection_id, creator_id, priority, .. } => {
                tracing::info!("Like received by {} on {} ({:?})", creator_id, connection_id, priority);
            }
            ConnectionSignal::ConnectionEstablished { connection_id, source, .. } => {
                tracing::info!("Connection {} established via {:?}", connection_id, source);
            }
        }
        Ok(())
    }
}

/// Notifier that forwards signals to an in-process consumer
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<ConnectionSignal>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ConnectionSignal>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, signal: ConnectionSignal) -> Result<(), NotifyError> {
        self.sender.send(signal).map_err(|_| NotifyError::ChannelClosed)
    }
}
