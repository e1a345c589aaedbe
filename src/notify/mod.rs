pub mod sink;

// Re-export commonly used types
pub use sink::{ChannelSink, LogSink, Notice, NoticeKind, NotificationSink, NotifyError, NullSink};
