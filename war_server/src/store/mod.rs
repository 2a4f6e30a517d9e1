//! 牌局与会话的持久化
//!
//! handler 只和 [`GameStore`] 打交道，具体实现在启动时决定。

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;
use war_core::{Game, GameId, Player, SessionId, WarError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("game {0} not found")]
    GameNotFound(GameId),

    #[error("guest seat of game {0} is already taken")]
    SeatTaken(GameId),

    #[error("session is not seated in game {0}")]
    NotSeated(GameId),

    #[error("game {game_id} holds unreadable state: {source}")]
    Corrupt {
        game_id: GameId,
        #[source]
        source: WarError,
    },

    #[error(transparent)]
    Rule(#[from] WarError),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot encode supporting piles: {0}")]
    Json(#[from] serde_json::Error),
}

/// 会话与牌局的存储接口
///
/// 所有调用都是阻塞的，异步代码应放到阻塞线程中执行。
pub trait GameStore: Send + Sync {
    fn create_session(&self, id: &SessionId) -> Result<(), StoreError>;

    fn session_exists(&self, id: &SessionId) -> Result<bool, StoreError>;

    /// 保存新发的牌局，返回带有分配 id 的牌局
    fn create_game(&self, host: Player, guest: Player) -> Result<Game, StoreError>;

    fn load_game(&self, id: GameId) -> Result<Game, StoreError>;

    /// 在一个事务中读取牌局、执行 `apply` 并保存结果。
    /// `apply` 失败时不写入任何内容，同一局的其他更新不会交错。
    fn update_game(
        &self,
        id: GameId,
        apply: &mut dyn FnMut(&mut Game) -> Result<(), StoreError>,
    ) -> Result<Game, StoreError>;

    /// 让 `session` 坐上客座。已经在座的会话再次加入不做任何改变。
    fn join_game(&self, id: GameId, session: &SessionId) -> Result<Game, StoreError> {
        self.update_game(id, &mut |game| {
            if game.role_of(session).is_some() {
                return Ok(());
            }
            if game.guest.session.is_some() {
                return Err(StoreError::SeatTaken(id));
            }
            game.guest.session = Some(session.clone());
            Ok(())
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    //! 所有存储实现都必须满足的行为，对每个实现各跑一遍

    use super::*;
    use war_core::{deal, FixedSource, RiffleShuffler, Role, DEFAULT_SHUFFLE_ROUNDS};

    pub fn session(id: &str) -> SessionId {
        SessionId(id.to_string())
    }

    pub fn new_game(store: &dyn GameStore, host: &SessionId) -> Game {
        let mut shuffler = RiffleShuffler::new(FixedSource(0.0));
        let (host_hand, guest_hand) = deal(&mut shuffler, DEFAULT_SHUFFLE_ROUNDS);
        store
            .create_game(
                Player::new(Role::Host, host_hand, Some(host.clone())),
                Player::new(Role::Guest, guest_hand, None),
            )
            .unwrap()
    }

    pub fn sessions_round_trip(store: &dyn GameStore) {
        let id = session("0123abcd");
        assert!(!store.session_exists(&id).unwrap());
        store.create_session(&id).unwrap();
        assert!(store.session_exists(&id).unwrap());
    }

    pub fn games_get_distinct_ids(store: &dyn GameStore) {
        let host = session("aa");
        store.create_session(&host).unwrap();
        let first = new_game(store, &host);
        let second = new_game(store, &host);
        assert_ne!(first.id, second.id);
        assert_eq!(store.load_game(first.id).unwrap(), first);
        assert!(matches!(store.load_game(first.id + 1000), Err(StoreError::GameNotFound(_))));
    }

    pub fn update_persists_flip(store: &dyn GameStore) {
        let host = session("aa");
        store.create_session(&host).unwrap();
        let game = new_game(store, &host);

        let updated = store
            .update_game(game.id, &mut |g| {
                g.flip(Role::Host)?;
                Ok(())
            })
            .unwrap();
        assert_eq!(updated.host.war.battling.len(), 1);
        assert_eq!(store.load_game(game.id).unwrap(), updated);
    }

    pub fn failed_update_is_rolled_back(store: &dyn GameStore) {
        let host = session("aa");
        store.create_session(&host).unwrap();
        let game = new_game(store, &host);

        let err = store
            .update_game(game.id, &mut |g| {
                g.flip(Role::Host)?;
                // 客人还没翻牌就第二次翻牌
                g.flip(Role::Host)?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Rule(WarError::AlreadyFlipped { role: Role::Host })));
        assert_eq!(store.load_game(game.id).unwrap(), game);
    }

    pub fn join_fills_guest_seat_once(store: &dyn GameStore) {
        let host = session("aa");
        let guest = session("bb");
        let late = session("cc");
        for s in [&host, &guest, &late] {
            store.create_session(s).unwrap();
        }
        let game = new_game(store, &host);

        // 房主重复加入不改变任何状态
        let same = store.join_game(game.id, &host).unwrap();
        assert_eq!(same.guest.session, None);

        let joined = store.join_game(game.id, &guest).unwrap();
        assert_eq!(joined.role_of(&guest), Some(Role::Guest));
        assert_eq!(store.load_game(game.id).unwrap().role_of(&guest), Some(Role::Guest));

        assert!(matches!(store.join_game(game.id, &late), Err(StoreError::SeatTaken(id)) if id == game.id));
        assert!(store.join_game(game.id, &guest).is_ok());
    }

    pub fn winner_is_persisted(store: &dyn GameStore) {
        let host = session("aa");
        store.create_session(&host).unwrap();
        let game = store
            .create_game(
                Player::new(Role::Host, "AC".parse().unwrap(), Some(host.clone())),
                Player::new(Role::Guest, "2D".parse().unwrap(), None),
            )
            .unwrap();

        store
            .update_game(game.id, &mut |g| {
                g.flip(Role::Host)?;
                g.flip(Role::Guest)?;
                Ok(())
            })
            .unwrap();
        let loaded = store.load_game(game.id).unwrap();
        assert_eq!(loaded.winner, Some(Role::Host));
        assert_eq!(loaded.host.won.to_string(), "2D,AC");
    }
}
