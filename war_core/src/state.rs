use serde::{Deserialize, Serialize};
use std::fmt;

use crate::deck::Deck;
use crate::error::WarError;
use crate::logic::War;

pub type GameId = i64;

/// 会话令牌 (SessionId)，十六进制编码的随机字节。核心库不解析其内容。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 玩家座位 (Role)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Host,
    Guest,
}

impl Role {
    pub fn code(&self) -> i64 {
        match self {
            Role::Host => 1,
            Role::Guest => 2,
        }
    }

    pub fn opponent(&self) -> Role {
        match self {
            Role::Host => Role::Guest,
            Role::Guest => Role::Host,
        }
    }
}

impl TryFrom<i64> for Role {
    type Error = WarError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Role::Host),
            2 => Ok(Role::Guest),
            other => Err(WarError::InvalidRole(other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Role::Host => "host",
            Role::Guest => "guest",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub role: Role,
    /// 无人入座时为 `None`
    pub session: Option<SessionId>,
    pub war: War,
    /// 赢来的牌，手牌打光后回收进手牌
    pub won: Deck,
}

impl Player {
    pub fn new(role: Role, hand: Deck, session: Option<SessionId>) -> Player {
        Player {
            role,
            session,
            war: War { hand, ..War::default() },
            won: Deck::new(),
        }
    }

    /// 玩家仍拥有的全部牌，包括桌上争夺中的牌
    pub fn total_cards(&self) -> usize {
        self.war.hand.len() + self.won.len() + self.war.contested()
    }

    pub fn is_seated_by(&self, session: &SessionId) -> bool {
        self.session.as_ref() == Some(session)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// 桌上没有牌
    Idle,
    /// 一方已翻牌，另一方尚未翻牌
    Battling,
    /// 明牌点数相同，双方继续下注
    War,
    Over { winner: Role },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub host: Player,
    pub guest: Player,
    pub winner: Option<Role>,
}

impl Game {
    pub fn new(id: GameId, host: Player, guest: Player) -> Game {
        Game { id, host, guest, winner: None }
    }

    pub fn player(&self, role: Role) -> &Player {
        match role {
            Role::Host => &self.host,
            Role::Guest => &self.guest,
        }
    }

    pub fn player_mut(&mut self, role: Role) -> &mut Player {
        match role {
            Role::Host => &mut self.host,
            Role::Guest => &mut self.guest,
        }
    }

    /// 同时取得 `(自己, 对手)` 的可变引用
    pub(crate) fn seats_mut(&mut self, role: Role) -> (&mut Player, &mut Player) {
        match role {
            Role::Host => (&mut self.host, &mut self.guest),
            Role::Guest => (&mut self.guest, &mut self.host),
        }
    }

    /// `session` 所在的座位
    pub fn role_of(&self, session: &SessionId) -> Option<Role> {
        [Role::Host, Role::Guest]
            .into_iter()
            .find(|role| self.player(*role).is_seated_by(session))
    }

    pub fn phase(&self) -> Phase {
        if let Some(winner) = self.winner {
            return Phase::Over { winner };
        }
        let host = self.host.war.battling.len();
        let guest = self.guest.war.battling.len();
        match (host, guest) {
            (0, 0) => Phase::Idle,
            // 数量相等且非空，只可能是平局后的战争
            (h, g) if h == g => Phase::War,
            (h, g) if h.max(g) == 1 => Phase::Battling,
            _ => Phase::War,
        }
    }

    /// `role` 是否轮到翻牌
    pub fn can_flip(&self, role: Role) -> bool {
        self.winner.is_none()
            && self.player(role).war.battling.len() <= self.player(role.opponent()).war.battling.len()
    }

    pub fn total_cards(&self) -> usize {
        self.host.total_cards() + self.guest.total_cards()
    }
}
