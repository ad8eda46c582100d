use crate::db::models::{DbArtwork, NewArtwork};
use crate::db::schema::SQLITE_INIT;
use crate::error::PantryError;
use chrono::SecondsFormat;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

#[derive(Debug)]
pub enum DbActorMessage {
    /// Insert an artwork row and return it with the assigned id.
    InsertArtwork(NewArtwork, RpcReplyPort<Result<DbArtwork, PantryError>>),

    /// List artworks, newest first, at most `limit` rows.
    ListArtworks(u32, RpcReplyPort<Result<Vec<DbArtwork>, PantryError>>),

    /// Get artwork by id.
    GetArtwork(i64, RpcReplyPort<Result<Option<DbArtwork>, PantryError>>),

    /// Delete artwork by id; replies whether a row was removed.
    DeleteArtwork(i64, RpcReplyPort<Result<bool, PantryError>>),

    /// All (id, filename) pairs, used by the reconcile sweep.
    ListFilenames(RpcReplyPort<Result<Vec<(i64, String)>, PantryError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn insert_artwork(&self, new: NewArtwork) -> Result<DbArtwork, PantryError> {
        ractor::call!(self.actor, DbActorMessage::InsertArtwork, new).map_err(|e| {
            PantryError::RactorError(format!("DbActor InsertArtwork RPC failed: {e}"))
        })?
    }

    pub async fn list_artworks(&self, limit: u32) -> Result<Vec<DbArtwork>, PantryError> {
        ractor::call!(self.actor, DbActorMessage::ListArtworks, limit).map_err(|e| {
            PantryError::RactorError(format!("DbActor ListArtworks RPC failed: {e}"))
        })?
    }

    pub async fn get_artwork(&self, id: i64) -> Result<Option<DbArtwork>, PantryError> {
        ractor::call!(self.actor, DbActorMessage::GetArtwork, id)
            .map_err(|e| PantryError::RactorError(format!("DbActor GetArtwork RPC failed: {e}")))?
    }

    pub async fn delete_artwork(&self, id: i64) -> Result<bool, PantryError> {
        ractor::call!(self.actor, DbActorMessage::DeleteArtwork, id).map_err(|e| {
            PantryError::RactorError(format!("DbActor DeleteArtwork RPC failed: {e}"))
        })?
    }

    pub async fn list_filenames(&self) -> Result<Vec<(i64, String)>, PantryError> {
        ractor::call!(self.actor, DbActorMessage::ListFilenames).map_err(|e| {
            PantryError::RactorError(format!("DbActor ListFilenames RPC failed: {e}"))
        })?
    }

    /// Stop the actor and wait for it to close the pool.
    pub async fn shutdown(&self) -> Result<(), PantryError> {
        self.actor
            .stop_and_wait(Some("shutdown".to_string()), Some(Duration::from_secs(10)))
            .await
            .map_err(|e| PantryError::RactorError(format!("DbActor shutdown failed: {e}")))
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        // The actor is the only writer; one connection is enough.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!(database_url = %database_url, "DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        state.pool.close().await;
        info!("DbActor stopped, pool closed");
        Ok(())
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::InsertArtwork(new, reply) => {
                let res = self.insert_artwork(&state.pool, new).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListArtworks(limit, reply) => {
                let res = self.list_artworks(&state.pool, limit).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetArtwork(id, reply) => {
                let res = self.get_artwork(&state.pool, id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::DeleteArtwork(id, reply) => {
                let res = self.delete_artwork(&state.pool, id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListFilenames(reply) => {
                let res = self.list_filenames(&state.pool).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn insert_artwork(
        &self,
        pool: &SqlitePool,
        new: NewArtwork,
    ) -> Result<DbArtwork, PantryError> {
        // Fixed-width text keeps lexical order equal to chronological order.
        let created_at = new.created_at.to_rfc3339_opts(SecondsFormat::Micros, true);

        let row = sqlx::query_as::<_, DbArtwork>(
            r#"
        INSERT INTO artworks (filename, width, height, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, filename, width, height, created_at
        "#,
        )
        .bind(new.filename)
        .bind(new.width)
        .bind(new.height)
        .bind(created_at)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    async fn list_artworks(
        &self,
        pool: &SqlitePool,
        limit: u32,
    ) -> Result<Vec<DbArtwork>, PantryError> {
        let rows = sqlx::query_as::<_, DbArtwork>(
            r#"
        SELECT id, filename, width, height, created_at
        FROM artworks
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
        )
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn get_artwork(
        &self,
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<DbArtwork>, PantryError> {
        let row = sqlx::query_as::<_, DbArtwork>(
            r#"
        SELECT id, filename, width, height, created_at
        FROM artworks
        WHERE id = ?
        "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn delete_artwork(&self, pool: &SqlitePool, id: i64) -> Result<bool, PantryError> {
        let result = sqlx::query("DELETE FROM artworks WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_filenames(&self, pool: &SqlitePool) -> Result<Vec<(i64, String)>, PantryError> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            r#"
        SELECT id, filename
        FROM artworks
        ORDER BY id
        "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}

/// Spawn the database actor and return a cloneable handle.
///
/// The actor is unnamed so several stores (e.g. in tests) can coexist in one process.
pub async fn spawn(database_url: &str) -> Result<DbActorHandle, PantryError> {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .map_err(|e| PantryError::RactorError(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), PantryError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
