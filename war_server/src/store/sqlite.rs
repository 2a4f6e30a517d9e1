use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use war_core::{Game, GameId, Player, PlayerRecord, SessionId};

use super::{GameStore, StoreError};

const SCHEMA: &str = "
    PRAGMA journal_mode=WAL;
    PRAGMA foreign_keys=ON;
    CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY,
        created TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    CREATE TABLE IF NOT EXISTS games (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        winner INTEGER,
        created TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
    CREATE TABLE IF NOT EXISTS game_players (
        game_id INTEGER NOT NULL REFERENCES games(id),
        role INTEGER NOT NULL,
        session_id TEXT REFERENCES sessions(id),
        hand TEXT NOT NULL,
        battling TEXT NOT NULL,
        supporting TEXT NOT NULL,
        won TEXT NOT NULL,
        PRIMARY KEY (game_id, role)
    );
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// 基于 SQLite 的存储
/// 所有写操作共用一个连接，同一局的事务不会交错。
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore { conn: Mutex::new(conn) })
    }
}

impl GameStore for SqliteStore {
    fn create_session(&self, id: &SessionId) -> Result<(), StoreError> {
        self.conn
            .lock()
            .execute("INSERT INTO sessions (id) VALUES (?1)", params![id.as_str()])?;
        Ok(())
    }

    fn session_exists(&self, id: &SessionId) -> Result<bool, StoreError> {
        let found = self
            .conn
            .lock()
            .query_row("SELECT 1 FROM sessions WHERE id = ?1", params![id.as_str()], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn create_game(&self, host: Player, guest: Player) -> Result<Game, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute("INSERT INTO games DEFAULT VALUES", [])?;
        let game = Game::new(tx.last_insert_rowid(), host, guest);
        for record in game.records() {
            save_player(&tx, game.id, &record)?;
        }

        tx.commit()?;
        debug!(game_id = game.id, "inserted game rows");
        Ok(game)
    }

    fn load_game(&self, id: GameId) -> Result<Game, StoreError> {
        read_game(&self.conn.lock(), id)
    }

    fn update_game(
        &self,
        id: GameId,
        apply: &mut dyn FnMut(&mut Game) -> Result<(), StoreError>,
    ) -> Result<Game, StoreError> {
        let mut conn = self.conn.lock();
        // 未提交的事务在 drop 时自动回滚
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut game = read_game(&tx, id)?;
        apply(&mut game)?;

        tx.execute(
            "UPDATE games SET winner = ?1, updated = CURRENT_TIMESTAMP WHERE id = ?2",
            params![game.winner.map(|role| role.code()), id],
        )?;
        for record in game.records() {
            save_player(&tx, id, &record)?;
        }

        tx.commit()?;
        Ok(game)
    }
}

fn save_player(conn: &Connection, game_id: GameId, record: &PlayerRecord) -> Result<(), StoreError> {
    let supporting = serde_json::to_string(&record.supporting)?;
    conn.execute(
        "INSERT INTO game_players (game_id, role, session_id, hand, battling, supporting, won)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT (game_id, role) DO UPDATE SET
             session_id = excluded.session_id,
             hand = excluded.hand,
             battling = excluded.battling,
             supporting = excluded.supporting,
             won = excluded.won",
        params![
            game_id,
            record.role,
            record.session_id,
            record.hand,
            record.battling,
            supporting,
            record.won
        ],
    )?;
    Ok(())
}

fn read_game(conn: &Connection, id: GameId) -> Result<Game, StoreError> {
    let winner: Option<i64> = conn
        .query_row("SELECT winner FROM games WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?
        .ok_or(StoreError::GameNotFound(id))?;

    let mut stmt = conn.prepare(
        "SELECT role, session_id, hand, battling, supporting, won
         FROM game_players WHERE game_id = ?1 ORDER BY role",
    )?;
    let rows = stmt.query_map(params![id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut records = Vec::with_capacity(2);
    for row in rows {
        let (role, session_id, hand, battling, supporting, won) = row?;
        records.push(PlayerRecord {
            role,
            session_id,
            hand,
            battling,
            supporting: serde_json::from_str(&supporting)?,
            won,
        });
    }

    Game::from_records(id, winner, records).map_err(|source| StoreError::Corrupt { game_id: id, source })
}
