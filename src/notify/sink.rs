use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

use crate::domain::{AmountType, UserId};

/// What a notification is about; each kind corresponds to one outbound
/// message template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    DepositMade,
    WithdrawalMade,
    LoanRequested,
    TransferSent,
    TransferReceived,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DepositMade => "deposit",
            Self::WithdrawalMade => "withdrawal",
            Self::LoanRequested => "loan_requested",
            Self::TransferSent => "transfer_sent",
            Self::TransferReceived => "transfer_received",
        };
        f.write_str(label)
    }
}

/// A single outbound notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice<A: AmountType> {
    pub user_id: UserId,
    pub kind: NoticeKind,
    pub amount: A,
}

/// Sink-side delivery failures
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification channel closed")]
    ChannelClosed,
}

/// Outbound notification collaborator.
///
/// Delivery is best-effort from the engine's perspective: a failed notify
/// is logged and never unwinds the financial mutation it follows.
pub trait NotificationSink<A: AmountType>: Send + Sync {
    fn notify(&self, notice: Notice<A>) -> Result<(), NotifyError>;
}

/// Log each notice via tracing; stands in for the real delivery service
pub struct LogSink;

impl<A: AmountType> NotificationSink<A> for LogSink {
    fn notify(&self, notice: Notice<A>) -> Result<(), NotifyError> {
        info!(
            user_id = notice.user_id,
            kind = %notice.kind,
            amount = %notice.amount.to_decimal_string(),
            "notification"
        );
        Ok(())
    }
}

/// Discard every notice
pub struct NullSink;

impl<A: AmountType> NotificationSink<A> for NullSink {
    fn notify(&self, _notice: Notice<A>) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Forward notices over an unbounded channel to an external consumer
pub struct ChannelSink<A: AmountType> {
    sender: mpsc::UnboundedSender<Notice<A>>,
}

impl<A: AmountType> ChannelSink<A> {
    /// Create a sink and the receiving half for the consumer
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice<A>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl<A: AmountType> NotificationSink<A> for ChannelSink<A> {
    fn notify(&self, notice: Notice<A>) -> Result<(), NotifyError> {
        self.sender
            .send(notice)
            .map_err(|_| NotifyError::ChannelClosed)
    }
}
