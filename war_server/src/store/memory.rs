use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use war_core::{Game, GameId, Player, SessionId};

use super::{GameStore, StoreError};

/// 进程内存储，重启后状态丢失
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: DashSet<SessionId>,
    games: DashMap<GameId, Game>,
    last_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryStore {
    fn create_session(&self, id: &SessionId) -> Result<(), StoreError> {
        self.sessions.insert(id.clone());
        Ok(())
    }

    fn session_exists(&self, id: &SessionId) -> Result<bool, StoreError> {
        Ok(self.sessions.contains(id))
    }

    fn create_game(&self, host: Player, guest: Player) -> Result<Game, StoreError> {
        let id = self.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        let game = Game::new(id, host, guest);
        self.games.insert(id, game.clone());
        Ok(game)
    }

    fn load_game(&self, id: GameId) -> Result<Game, StoreError> {
        self.games
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::GameNotFound(id))
    }

    fn update_game(
        &self,
        id: GameId,
        apply: &mut dyn FnMut(&mut Game) -> Result<(), StoreError>,
    ) -> Result<Game, StoreError> {
        // `entry` 释放前一直持有分片写锁
        let mut entry = self.games.get_mut(&id).ok_or(StoreError::GameNotFound(id))?;
        let mut game = entry.value().clone();
        apply(&mut game)?;
        *entry.value_mut() = game.clone();
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests as shared;

    #[test]
    fn test_sessions_round_trip() {
        shared::sessions_round_trip(&MemoryStore::new());
    }

    #[test]
    fn test_games_get_distinct_ids() {
        shared::games_get_distinct_ids(&MemoryStore::new());
    }

    #[test]
    fn test_update_persists_flip() {
        shared::update_persists_flip(&MemoryStore::new());
    }

    #[test]
    fn test_failed_update_is_rolled_back() {
        shared::failed_update_is_rolled_back(&MemoryStore::new());
    }

    #[test]
    fn test_join_fills_guest_seat_once() {
        shared::join_fills_guest_seat_once(&MemoryStore::new());
    }

    #[test]
    fn test_winner_is_persisted() {
        shared::winner_is_persisted(&MemoryStore::new());
    }
}
