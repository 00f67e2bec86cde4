use crate::domain::model::RunOutcome;
use crate::domain::ports::NotificationChannel;

/// Best-effort publisher for the run's terminal notification.
///
/// `notify` returns nothing: an unset topic or a failing channel is logged
/// and swallowed, so reporting can never change the outcome being reported.
pub struct Notifier<N: NotificationChannel> {
    channel: N,
}

impl<N: NotificationChannel> Notifier<N> {
    pub fn new(channel: N) -> Self {
        Self { channel }
    }

    pub async fn notify(&self, topic: Option<&str>, outcome: &RunOutcome) {
        let kind = if outcome.is_success() { "success" } else { "failure" };

        let Some(topic) = topic else {
            tracing::warn!(
                "SNS_TOPIC_ARN is not set. Cannot send {} notification.",
                kind
            );
            return;
        };

        let message = outcome.message();
        match self.channel.publish(topic, outcome.subject(), &message).await {
            Ok(message_id) => {
                tracing::info!("✅ {} notification sent: {}", kind, message_id);
            }
            Err(e) => {
                tracing::warn!("Failed to send {} notification: {}", kind, e);
            }
        }
    }
}
