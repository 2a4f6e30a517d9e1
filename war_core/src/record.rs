//! 牌局的持久化形式 (PlayerRecord)
//!
//! 各牌堆使用 [`Deck`] 的 `Display`/`FromStr` 字符串格式保存，
//! 数据库里的行可以直接读懂。

use serde::{Deserialize, Serialize};

use crate::deck::Deck;
use crate::error::WarError;
use crate::logic::War;
use crate::state::{Game, GameId, Player, Role, SessionId};

/// 一局游戏中的一个座位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub role: i64,
    pub session_id: Option<String>,
    pub hand: String,
    pub battling: String,
    pub supporting: Vec<String>,
    pub won: String,
}

impl From<&Player> for PlayerRecord {
    fn from(player: &Player) -> Self {
        PlayerRecord {
            role: player.role.code(),
            session_id: player.session.as_ref().map(|s| s.0.clone()),
            hand: player.war.hand.to_string(),
            battling: player.war.battling.to_string(),
            supporting: player.war.supporting.iter().map(Deck::to_string).collect(),
            won: player.won.to_string(),
        }
    }
}

impl TryFrom<PlayerRecord> for Player {
    type Error = WarError;

    fn try_from(record: PlayerRecord) -> Result<Self, Self::Error> {
        let role = Role::try_from(record.role)?;
        let supporting = record
            .supporting
            .iter()
            .map(|batch| batch.parse())
            .collect::<Result<Vec<Deck>, _>>()?;

        Ok(Player {
            role,
            session: record.session_id.map(SessionId),
            war: War {
                hand: record.hand.parse()?,
                battling: record.battling.parse()?,
                supporting,
            },
            won: record.won.parse()?,
        })
    }
}

impl Game {
    /// 先房主，后客人
    pub fn records(&self) -> [PlayerRecord; 2] {
        [PlayerRecord::from(&self.host), PlayerRecord::from(&self.guest)]
    }

    /// 从两条座位记录重建牌局。
    /// 每条记录都必须能解码，且每个座位恰好出现一次。
    pub fn from_records(
        id: GameId,
        winner: Option<i64>,
        records: impl IntoIterator<Item = PlayerRecord>,
    ) -> Result<Game, WarError> {
        let mut host = None;
        let mut guest = None;

        for record in records {
            let player = Player::try_from(record)?;
            let slot = match player.role {
                Role::Host => &mut host,
                Role::Guest => &mut guest,
            };
            if slot.is_some() {
                return Err(WarError::DuplicateSeat { role: player.role });
            }
            *slot = Some(player);
        }

        let host = host.ok_or(WarError::MissingSeat { role: Role::Host })?;
        let guest = guest.ok_or(WarError::MissingSeat { role: Role::Guest })?;
        let winner = winner.map(Role::try_from).transpose()?;

        Ok(Game { id, host, guest, winner })
    }
}
