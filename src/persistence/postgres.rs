//! PostgreSQL implementation of the event store.
//!
//! Schema lives in `migrations/`. Close and draw commits run inside a
//! single transaction with optimistic guards (`WHERE open`,
//! `WHERE win_rank IS NULL`) so concurrent duplicates roll back instead
//! of double-writing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::EventStore;
use crate::domain::{Event, EventId, EventKind, GuildId, Pairing, Registrant, UserId};
use crate::error::BotError;

/// PostgreSQL unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Event row without the kind column (the kind is always bound in the
/// query that produced the row).
type EventRow = (i64, String, i64, i64, bool, Option<i32>, DateTime<Utc>);

/// Registrant row.
type RegistrantRow = (i64, i64, Option<i32>, DateTime<Utc>);

/// PostgreSQL-backed event store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_err(e: sqlx::Error) -> BotError {
    BotError::Store(e.to_string())
}

/// Maps a unique-violation insert error to `dup`, anything else to
/// [`BotError::Store`].
fn insert_err(e: sqlx::Error, dup: BotError) -> BotError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => dup,
        _ => store_err(e),
    }
}

fn event_from_row(kind: EventKind, row: EventRow) -> Event {
    let (id, name, guild_id, owner_id, open, num_winners, created_at) = row;
    Event {
        id: EventId::new(id),
        kind,
        name,
        guild_id: GuildId::new(guild_id),
        owner_id: UserId::new(owner_id),
        open,
        num_winners,
        created_at,
    }
}

fn registrant_from_row(row: RegistrantRow) -> Registrant {
    let (event_id, user_id, win_rank, created_at) = row;
    Registrant {
        event_id: EventId::new(event_id),
        user_id: UserId::new(user_id),
        win_rank,
        created_at,
    }
}

#[async_trait]
impl EventStore for PostgresStore {
    async fn create_event(
        &self,
        kind: EventKind,
        name: &str,
        guild: GuildId,
        owner: UserId,
    ) -> Result<Event, BotError> {
        let row = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            "INSERT INTO events (kind, name, guild_id, owner_id, open) \
             VALUES ($1, $2, $3, $4, TRUE) RETURNING id, created_at",
        )
        .bind(kind.as_str())
        .bind(name)
        .bind(guild.get())
        .bind(owner.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            insert_err(
                e,
                BotError::DuplicateName {
                    kind,
                    name: name.to_string(),
                },
            )
        })?;

        let (id, created_at) = row;
        Ok(Event {
            id: EventId::new(id),
            kind,
            name: name.to_string(),
            guild_id: guild,
            owner_id: owner,
            open: true,
            num_winners: None,
            created_at,
        })
    }

    async fn find_event(
        &self,
        kind: EventKind,
        name: &str,
        guild: GuildId,
    ) -> Result<Option<Event>, BotError> {
        let row = sqlx::query_as::<_, EventRow>(
            "SELECT id, name, guild_id, owner_id, open, num_winners, created_at \
             FROM events WHERE kind = $1 AND name = $2 AND guild_id = $3",
        )
        .bind(kind.as_str())
        .bind(name)
        .bind(guild.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(|r| event_from_row(kind, r)))
    }

    async fn list_open_events(
        &self,
        kind: EventKind,
        guild: GuildId,
    ) -> Result<Vec<Event>, BotError> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT id, name, guild_id, owner_id, open, num_winners, created_at \
             FROM events WHERE kind = $1 AND guild_id = $2 AND open ORDER BY created_at",
        )
        .bind(kind.as_str())
        .bind(guild.get())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows
            .into_iter()
            .map(|r| event_from_row(kind, r))
            .collect())
    }

    async fn add_registrant(&self, event: &Event, user: UserId) -> Result<(), BotError> {
        sqlx::query("INSERT INTO registrants (event_id, user_id) VALUES ($1, $2)")
            .bind(event.id.get())
            .bind(user.get())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                insert_err(
                    e,
                    BotError::AlreadyRegistered {
                        name: event.name.clone(),
                    },
                )
            })?;
        Ok(())
    }

    async fn is_registered(&self, event: EventId, user: UserId) -> Result<bool, BotError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrants WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event.get())
        .bind(user.get())
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(count > 0)
    }

    async fn list_registrants(&self, event: EventId) -> Result<Vec<Registrant>, BotError> {
        let rows = sqlx::query_as::<_, RegistrantRow>(
            "SELECT event_id, user_id, win_rank, created_at FROM registrants \
             WHERE event_id = $1 ORDER BY created_at, user_id",
        )
        .bind(event.get())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows.into_iter().map(registrant_from_row).collect())
    }

    async fn list_unranked_registrants(
        &self,
        event: EventId,
    ) -> Result<Vec<Registrant>, BotError> {
        let rows = sqlx::query_as::<_, RegistrantRow>(
            "SELECT event_id, user_id, win_rank, created_at FROM registrants \
             WHERE event_id = $1 AND win_rank IS NULL ORDER BY created_at, user_id",
        )
        .bind(event.get())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows.into_iter().map(registrant_from_row).collect())
    }

    async fn delete_registrant(&self, event: EventId, user: UserId) -> Result<(), BotError> {
        sqlx::query("DELETE FROM registrants WHERE event_id = $1 AND user_id = $2")
            .bind(event.get())
            .bind(user.get())
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn close_with_pairings(
        &self,
        event: &Event,
        pairings: &[Pairing],
    ) -> Result<(), BotError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let updated = sqlx::query("UPDATE events SET open = FALSE WHERE id = $1 AND open")
            .bind(event.id.get())
            .execute(&mut *tx)
            .await
            .map_err(store_err)?
            .rows_affected();
        if updated == 0 {
            // A concurrent close won; the transaction rolls back on drop.
            return Err(BotError::AlreadyClosed {
                kind: event.kind,
                name: event.name.clone(),
            });
        }

        for pairing in pairings {
            sqlx::query("INSERT INTO pairings (event_id, santa_id, target_id) VALUES ($1, $2, $3)")
                .bind(pairing.event_id.get())
                .bind(pairing.santa_id.get())
                .bind(pairing.target_id.get())
                .execute(&mut *tx)
                .await
                .map_err(store_err)?;
        }

        tx.commit().await.map_err(store_err)
    }

    async fn close_event(&self, event: &Event) -> Result<(), BotError> {
        let updated = sqlx::query("UPDATE events SET open = FALSE WHERE id = $1 AND open")
            .bind(event.id.get())
            .execute(&self.pool)
            .await
            .map_err(store_err)?
            .rows_affected();
        if updated == 0 {
            return Err(BotError::AlreadyClosed {
                kind: event.kind,
                name: event.name.clone(),
            });
        }
        Ok(())
    }

    async fn commit_draw(
        &self,
        event: &Event,
        winners: &[(i32, UserId)],
        new_total: i32,
    ) -> Result<(), BotError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let updated = sqlx::query("UPDATE events SET num_winners = $2 WHERE id = $1 AND open")
            .bind(event.id.get())
            .bind(new_total)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?
            .rows_affected();
        if updated == 0 {
            return Err(BotError::AlreadyClosed {
                kind: event.kind,
                name: event.name.clone(),
            });
        }

        for (rank, user) in winners {
            let ranked = sqlx::query(
                "UPDATE registrants SET win_rank = $3 \
                 WHERE event_id = $1 AND user_id = $2 AND win_rank IS NULL",
            )
            .bind(event.id.get())
            .bind(user.get())
            .bind(rank)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?
            .rows_affected();
            if ranked == 0 {
                // Registrant vanished or was ranked by a concurrent draw.
                return Err(BotError::Store(format!(
                    "draw raced on registrant {user} of {}",
                    event.name
                )));
            }
        }

        tx.commit().await.map_err(store_err)
    }

    async fn list_winners(&self, event: EventId) -> Result<Vec<Registrant>, BotError> {
        let rows = sqlx::query_as::<_, RegistrantRow>(
            "SELECT event_id, user_id, win_rank, created_at FROM registrants \
             WHERE event_id = $1 AND win_rank IS NOT NULL ORDER BY win_rank",
        )
        .bind(event.get())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows.into_iter().map(registrant_from_row).collect())
    }

    async fn find_events_for_registrant(
        &self,
        kind: EventKind,
        name: &str,
        user: UserId,
    ) -> Result<Vec<Event>, BotError> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT e.id, e.name, e.guild_id, e.owner_id, e.open, e.num_winners, e.created_at \
             FROM events e JOIN registrants r ON r.event_id = e.id \
             WHERE e.kind = $1 AND e.name = $2 AND r.user_id = $3 ORDER BY e.created_at",
        )
        .bind(kind.as_str())
        .bind(name)
        .bind(user.get())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows
            .into_iter()
            .map(|r| event_from_row(kind, r))
            .collect())
    }

    async fn pairing_for_santa(
        &self,
        event: EventId,
        santa: UserId,
    ) -> Result<Option<Pairing>, BotError> {
        let row = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT event_id, santa_id, target_id FROM pairings \
             WHERE event_id = $1 AND santa_id = $2",
        )
        .bind(event.get())
        .bind(santa.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(|(event_id, santa_id, target_id)| Pairing {
            event_id: EventId::new(event_id),
            santa_id: UserId::new(santa_id),
            target_id: UserId::new(target_id),
        }))
    }

    async fn pairing_for_target(
        &self,
        event: EventId,
        target: UserId,
    ) -> Result<Option<Pairing>, BotError> {
        let row = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT event_id, santa_id, target_id FROM pairings \
             WHERE event_id = $1 AND target_id = $2",
        )
        .bind(event.get())
        .bind(target.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(|(event_id, santa_id, target_id)| Pairing {
            event_id: EventId::new(event_id),
            santa_id: UserId::new(santa_id),
            target_id: UserId::new(target_id),
        }))
    }
}
