//! # War 卡牌游戏核心库
//!
//! 双人卡牌游戏 "War" 的牌、牌堆、洗牌以及对战/战争规则。
//! 这里的代码全部是同步的，不做任何 I/O；
//! 状态如何存储、同一局的并发翻牌如何串行化，都由服务器（或其他前端）决定。

mod card;
mod deck;
mod error;
mod logic;
mod record;
mod shuffle;
mod state;
mod view;

pub use card::*;

pub use deck::*;

pub use error::WarError;

pub use logic::*;

pub use record::PlayerRecord;

pub use shuffle::*;

pub use state::*;

pub use view::*;
