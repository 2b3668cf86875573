//! Anonymous message relay between pairing partners.
//!
//! After an exchange is drawn, a santa and their giftee can talk to each
//! other through the bot without learning who the other is. The relay
//! only works from a direct message so that the sender's identity never
//! leaks into a guild channel.

use std::str::FromStr;
use std::sync::Arc;

use crate::chat::Messenger;
use crate::domain::{EventKind, UserId};
use crate::error::BotError;
use crate::persistence::EventStore;

/// Which pairing partner the anonymous message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayDirection {
    /// Santa writing to the person they are gifting.
    ToTarget,
    /// Giftee writing back to their (unknown) santa.
    ToSanta,
}

impl FromStr for RelayDirection {
    type Err = BotError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "to-target" => Ok(Self::ToTarget),
            "to-santa" => Ok(Self::ToSanta),
            other => Err(BotError::InvalidRequest(format!(
                "{other} is not a relay direction, use to-target or to-santa"
            ))),
        }
    }
}

/// Forwards anonymous messages along a pairing edge.
#[derive(Debug)]
pub struct Relay {
    store: Arc<dyn EventStore>,
    messenger: Arc<dyn Messenger>,
}

impl Relay {
    /// Creates a new `Relay`.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>, messenger: Arc<dyn Messenger>) -> Self {
        Self { store, messenger }
    }

    /// Forwards `text` from `sender` to their pairing partner in the
    /// named exchange, quoting it under an anonymous header. Returns the
    /// recipient's user id.
    ///
    /// The exchange is resolved by name across every guild the sender is
    /// registered in, since a direct message carries no guild scope.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::NotDirectMessage`] when `direct` is false,
    /// [`BotError::NotRegistered`] when the sender is in no exchange of
    /// this name, [`BotError::InvalidRequest`] when every matching
    /// exchange is still open, [`BotError::PairingNotFound`] when no
    /// pairing row exists for the sender, and [`BotError::ChatApi`] when
    /// the DM cannot be delivered.
    pub async fn forward(
        &self,
        name: &str,
        sender: UserId,
        direction: RelayDirection,
        text: &str,
        direct: bool,
    ) -> Result<UserId, BotError> {
        if !direct {
            return Err(BotError::NotDirectMessage);
        }

        let events = self
            .store
            .find_events_for_registrant(EventKind::Exchange, name, sender)
            .await?;
        if events.is_empty() {
            return Err(BotError::NotRegistered {
                name: name.to_string(),
            });
        }

        let closed: Vec<_> = events.into_iter().filter(|event| !event.open).collect();
        if closed.is_empty() {
            return Err(BotError::InvalidRequest(format!(
                "the exchange {name} has not been drawn yet"
            )));
        }

        // Name collisions across guilds are possible; use the first
        // closed exchange that actually has a pairing for the sender.
        let mut recipient = None;
        for event in &closed {
            let pairing = match direction {
                RelayDirection::ToTarget => {
                    self.store.pairing_for_santa(event.id, sender).await?
                }
                RelayDirection::ToSanta => {
                    self.store.pairing_for_target(event.id, sender).await?
                }
            };
            if let Some(pairing) = pairing {
                recipient = Some(match direction {
                    RelayDirection::ToTarget => pairing.target_id,
                    RelayDirection::ToSanta => pairing.santa_id,
                });
                break;
            }
        }
        let Some(recipient) = recipient else {
            return Err(BotError::PairingNotFound {
                name: name.to_string(),
            });
        };

        let header = match direction {
            RelayDirection::ToTarget => "A message from your Secret Santa:",
            RelayDirection::ToSanta => "A message from your giftee:",
        };
        let dm = format!("{header}\n{}", quoted_block(text));
        self.messenger.send_dm(recipient, &dm).await?;
        tracing::info!(%sender, %recipient, exchange = %name, "relayed anonymous message");

        Ok(recipient)
    }
}

/// Quotes every line of the message so the relayed text is visually
/// separate from the bot's own words.
fn quoted_block(text: &str) -> String {
    text.lines()
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::domain::{GuildId, Pairing, cyclic_pairing};
    use crate::persistence::MemoryStore;

    #[derive(Debug, Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<(UserId, String)>>,
        failing: HashSet<UserId>,
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send_dm(&self, user: UserId, text: &str) -> Result<(), BotError> {
            if self.failing.contains(&user) {
                return Err(BotError::ChatApi("dms disabled".to_string()));
            }
            if let Ok(mut sent) = self.sent.lock() {
                sent.push((user, text.to_string()));
            }
            Ok(())
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        messenger: Arc<RecordingMessenger>,
        relay: Relay,
    }

    fn fixture_with(messenger: RecordingMessenger) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let messenger = Arc::new(messenger);
        let relay = Relay::new(
            Arc::clone(&store) as Arc<dyn EventStore>,
            Arc::clone(&messenger) as Arc<dyn Messenger>,
        );
        Fixture {
            store,
            messenger,
            relay,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingMessenger::default())
    }

    /// Registers users 1..=3 in a "Winter" exchange, closes it with a
    /// seeded pairing, and returns the santa-to-target edges.
    async fn seed_closed_exchange(store: &MemoryStore) -> Vec<Pairing> {
        let Ok(event) = store
            .create_event(
                EventKind::Exchange,
                "Winter",
                GuildId::new(1),
                UserId::new(1000),
            )
            .await
        else {
            panic!("event creation failed");
        };
        let users: Vec<UserId> = (1..=3).map(UserId::new).collect();
        for user in &users {
            let Ok(()) = store.add_registrant(&event, *user).await else {
                panic!("registration failed");
            };
        }
        let mut rng = StdRng::seed_from_u64(42);
        let Ok(edges) = cyclic_pairing(&mut rng, &users) else {
            panic!("pairing failed");
        };
        let pairings: Vec<Pairing> = edges
            .into_iter()
            .map(|(santa_id, target_id)| Pairing {
                event_id: event.id,
                santa_id,
                target_id,
            })
            .collect();
        let Ok(()) = store.close_with_pairings(&event, &pairings).await else {
            panic!("close failed");
        };
        pairings
    }

    #[tokio::test]
    async fn santa_message_reaches_the_target_quoted() {
        let fx = fixture();
        let pairings = seed_closed_exchange(&fx.store).await;
        let Some(edge) = pairings.first() else {
            panic!("no pairings");
        };

        let Ok(recipient) = fx
            .relay
            .forward(
                "Winter",
                edge.santa_id,
                RelayDirection::ToTarget,
                "what size\nare you?",
                true,
            )
            .await
        else {
            panic!("relay failed");
        };
        assert_eq!(recipient, edge.target_id);

        let Ok(sent) = fx.messenger.sent.lock() else {
            panic!("mutex poisoned");
        };
        let Some((user, text)) = sent.first() else {
            panic!("no dm sent");
        };
        assert_eq!(*user, edge.target_id);
        assert_eq!(
            text,
            "A message from your Secret Santa:\n> what size\n> are you?"
        );
    }

    #[tokio::test]
    async fn giftee_reply_reaches_the_santa() {
        let fx = fixture();
        let pairings = seed_closed_exchange(&fx.store).await;
        let Some(edge) = pairings.first() else {
            panic!("no pairings");
        };

        let Ok(recipient) = fx
            .relay
            .forward(
                "Winter",
                edge.target_id,
                RelayDirection::ToSanta,
                "medium, thanks!",
                true,
            )
            .await
        else {
            panic!("relay failed");
        };
        assert_eq!(recipient, edge.santa_id);

        let Ok(sent) = fx.messenger.sent.lock() else {
            panic!("mutex poisoned");
        };
        let Some((_, text)) = sent.first() else {
            panic!("no dm sent");
        };
        assert!(text.starts_with("A message from your giftee:"));
    }

    #[tokio::test]
    async fn relay_outside_a_direct_message_is_rejected() {
        let fx = fixture();
        let _ = seed_closed_exchange(&fx.store).await;

        let result = fx
            .relay
            .forward("Winter", UserId::new(1), RelayDirection::ToTarget, "hi", false)
            .await;
        assert!(matches!(result, Err(BotError::NotDirectMessage)));

        let Ok(sent) = fx.messenger.sent.lock() else {
            panic!("mutex poisoned");
        };
        assert!(sent.is_empty());
    }

    #[tokio::test]
    async fn unregistered_sender_is_rejected() {
        let fx = fixture();
        let _ = seed_closed_exchange(&fx.store).await;

        let result = fx
            .relay
            .forward("Winter", UserId::new(99), RelayDirection::ToTarget, "hi", true)
            .await;
        assert!(matches!(result, Err(BotError::NotRegistered { .. })));
    }

    #[tokio::test]
    async fn relay_before_the_draw_is_rejected() {
        let fx = fixture();
        let Ok(event) = fx
            .store
            .create_event(
                EventKind::Exchange,
                "Winter",
                GuildId::new(1),
                UserId::new(1000),
            )
            .await
        else {
            panic!("event creation failed");
        };
        let Ok(()) = fx.store.add_registrant(&event, UserId::new(1)).await else {
            panic!("registration failed");
        };

        let result = fx
            .relay
            .forward("Winter", UserId::new(1), RelayDirection::ToTarget, "hi", true)
            .await;
        assert!(matches!(result, Err(BotError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn delivery_failure_propagates() {
        let fx = fixture_with(RecordingMessenger {
            sent: Mutex::new(Vec::new()),
            failing: (1..=3).map(UserId::new).collect(),
        });
        let pairings = seed_closed_exchange(&fx.store).await;
        let Some(edge) = pairings.first() else {
            panic!("no pairings");
        };

        let result = fx
            .relay
            .forward("Winter", edge.santa_id, RelayDirection::ToTarget, "hi", true)
            .await;
        assert!(matches!(result, Err(BotError::ChatApi(_))));
    }

    #[test]
    fn direction_parsing() {
        let Ok(to_target) = "to-target".parse::<RelayDirection>() else {
            panic!("to-target did not parse");
        };
        assert_eq!(to_target, RelayDirection::ToTarget);
        let Ok(to_santa) = " TO-SANTA ".parse::<RelayDirection>() else {
            panic!("to-santa did not parse");
        };
        assert_eq!(to_santa, RelayDirection::ToSanta);
        assert!("sideways".parse::<RelayDirection>().is_err());
    }
}
