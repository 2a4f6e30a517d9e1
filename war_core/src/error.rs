use thiserror::Error;

use crate::state::Role;

/// 核心库中所有可能的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WarError {
    /// 牌面代码或牌堆字符串格式错误
    #[error("cannot parse {slug:?}: {reason}")]
    Parse { slug: String, reason: &'static str },

    /// 手中无牌却尝试翻牌
    #[error("no cards available to flip")]
    EmptyHand,

    /// 持久化的座位编码既不是房主也不是客人
    #[error("unsupported player role code {0}")]
    InvalidRole(i64),

    /// 玩家已翻牌，正在等待对手
    #[error("{role} has already flipped and is waiting on the opponent")]
    AlreadyFlipped { role: Role },

    #[error("game is over, {winner} won")]
    GameOver { winner: Role },

    /// 持久化状态缺少某个座位
    #[error("game has no {role} seat")]
    MissingSeat { role: Role },

    #[error("game has more than one {role} seat")]
    DuplicateSeat { role: Role },
}

impl WarError {
    pub(crate) fn parse(slug: &str, reason: &'static str) -> Self {
        WarError::Parse { slug: slug.to_string(), reason }
    }
}
