//! Result notification: pairing DMs and winner summaries.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::chat::{Membership, Messenger};
use crate::domain::{GuildId, Pairing, UserId};

/// Delivery tally for a pairing notification fan-out.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyOutcome {
    /// Santas whose direct message was delivered.
    pub notified: usize,
    /// Santas whose direct message failed (e.g. DMs disabled).
    pub unreachable: usize,
}

/// Delivers result messages to affected users.
///
/// All per-user sends are independent and best-effort: a failed delivery
/// is logged and counted, never propagated, and never blocks the other
/// recipients.
#[derive(Debug)]
pub struct Notifier {
    membership: Arc<dyn Membership>,
    messenger: Arc<dyn Messenger>,
}

impl Notifier {
    /// Creates a new `Notifier`.
    #[must_use]
    pub fn new(membership: Arc<dyn Membership>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            membership,
            messenger,
        }
    }

    /// Privately tells each santa who they drew, with relay usage
    /// instructions. Sends run concurrently; recipients are disjoint.
    pub async fn notify_pairings(
        &self,
        guild: GuildId,
        exchange_name: &str,
        pairings: &[Pairing],
    ) -> NotifyOutcome {
        let sends = pairings
            .iter()
            .map(|pairing| self.notify_santa(guild, exchange_name, pairing));
        let delivered = join_all(sends).await;

        let notified = delivered.iter().filter(|ok| **ok).count();
        NotifyOutcome {
            notified,
            unreachable: delivered.len() - notified,
        }
    }

    async fn notify_santa(&self, guild: GuildId, exchange_name: &str, pairing: &Pairing) -> bool {
        let target_name = self
            .membership
            .display_name(guild, pairing.target_id)
            .await;
        let text = format!(
            "You are the Secret Santa for **{target_name}** in {exchange_name}!\n\
             You can message them anonymously: DM me \
             `!santa message {exchange_name} to-target <your message>`.\n\
             Messages from your own Santa arrive the same way, and you can \
             reply with `!santa message {exchange_name} to-santa <your message>`."
        );

        match self.messenger.send_dm(pairing.santa_id, &text).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, santa = %pairing.santa_id, "pairing notification failed");
                false
            }
        }
    }

    /// Resolves display names for a roster of users, in order.
    pub async fn roster(&self, guild: GuildId, users: &[UserId]) -> Vec<String> {
        let lookups = users
            .iter()
            .map(|user| self.membership.display_name(guild, *user));
        join_all(lookups).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::EventId;
    use crate::error::BotError;

    #[derive(Debug, Default)]
    struct StubDirectory;

    #[async_trait]
    impl Membership for StubDirectory {
        async fn is_member(&self, _guild: GuildId, _user: UserId) -> Result<bool, BotError> {
            Ok(true)
        }

        async fn display_name(&self, _guild: GuildId, user: UserId) -> String {
            format!("member-{user}")
        }
    }

    #[derive(Debug, Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<(UserId, String)>>,
        failing: HashSet<UserId>,
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send_dm(&self, user: UserId, text: &str) -> Result<(), BotError> {
            if self.failing.contains(&user) {
                return Err(BotError::ChatApi("DMs disabled".to_string()));
            }
            if let Ok(mut sent) = self.sent.lock() {
                sent.push((user, text.to_string()));
            }
            Ok(())
        }
    }

    fn pairing(santa: i64, target: i64) -> Pairing {
        Pairing {
            event_id: EventId::new(1),
            santa_id: UserId::new(santa),
            target_id: UserId::new(target),
        }
    }

    #[tokio::test]
    async fn every_santa_gets_their_target_name() {
        let messenger = Arc::new(RecordingMessenger::default());
        let notifier = Notifier::new(
            Arc::new(StubDirectory),
            Arc::clone(&messenger) as Arc<dyn Messenger>,
        );

        let outcome = notifier
            .notify_pairings(
                GuildId::new(1),
                "Winter",
                &[pairing(1, 2), pairing(2, 3), pairing(3, 1)],
            )
            .await;

        assert_eq!(outcome.notified, 3);
        assert_eq!(outcome.unreachable, 0);

        let Ok(sent) = messenger.sent.lock() else {
            panic!("mutex poisoned");
        };
        let to_first = sent
            .iter()
            .find(|(user, _)| *user == UserId::new(1))
            .map(|(_, text)| text.clone());
        let Some(text) = to_first else {
            panic!("santa 1 was not notified");
        };
        assert!(text.contains("member-2"));
        assert!(text.contains("Winter"));
    }

    #[tokio::test]
    async fn one_unreachable_santa_does_not_block_the_rest() {
        let messenger = Arc::new(RecordingMessenger {
            sent: Mutex::new(Vec::new()),
            failing: HashSet::from([UserId::new(2)]),
        });
        let notifier = Notifier::new(
            Arc::new(StubDirectory),
            Arc::clone(&messenger) as Arc<dyn Messenger>,
        );

        let outcome = notifier
            .notify_pairings(
                GuildId::new(1),
                "Winter",
                &[pairing(1, 2), pairing(2, 3), pairing(3, 1)],
            )
            .await;

        assert_eq!(outcome.notified, 2);
        assert_eq!(outcome.unreachable, 1);
    }

}
