use serde::{Deserialize, Serialize};
use std::collections::{vec_deque, VecDeque};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

use crate::card::{Card, FaceValue, Suit};
use crate::error::WarError;
use crate::shuffle::Shuffler;

/// 默认洗牌轮数。七次鸽尾式洗牌足以把 52 张牌洗匀。
pub const DEFAULT_SHUFFLE_ROUNDS: usize = 7;

/// 有序牌堆 (Deck)
/// 下标 0 是牌顶，也就是下一张被抽出的牌。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Deck(VecDeque<Card>);

impl Deck {
    pub fn new() -> Deck {
        Deck(VecDeque::new())
    }

    /// 一副标准 52 张牌：按花色（梅花、方块、红心、黑桃）排列，同花色内点数升序
    pub fn standard() -> Deck {
        Suit::ALL
            .into_iter()
            .flat_map(|suit| FaceValue::all().map(move |value| Card { suit, value }))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 从牌顶数起第 `index` 张
    pub fn get(&self, index: usize) -> Option<&Card> {
        self.0.get(index)
    }

    pub fn to_vec(&self) -> Vec<Card> {
        self.0.iter().copied().collect()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Card> {
        self.0.iter()
    }

    /// 牌底的那张
    pub fn last(&self) -> Option<&Card> {
        self.0.back()
    }

    pub fn push(&mut self, card: Card) {
        self.0.push_back(card);
    }

    /// 把 `other` 的牌全部移到本牌堆底部，`other` 变空
    pub fn append(&mut self, other: &mut Deck) {
        self.0.append(&mut other.0);
    }

    /// 从牌顶抽一张
    pub fn draw(&mut self) -> Option<Card> {
        self.0.pop_front()
    }

    /// 从牌顶取至多 `n` 张，保持顺序
    pub fn take_top(&mut self, n: usize) -> Deck {
        let n = n.min(self.0.len());
        Deck(self.0.drain(..n).collect())
    }

    /// 从牌底取一张
    pub fn pop(&mut self) -> Option<Card> {
        self.0.pop_back()
    }

    /// 按下标奇偶切牌：偶数下标归右，奇数下标归左。
    /// 奇数张时多出的一张落在右半边。
    pub fn cut(&self) -> (Deck, Deck) {
        let mut left = VecDeque::with_capacity(self.len() / 2);
        let mut right = VecDeque::with_capacity(self.len() - self.len() / 2);
        for (i, card) in self.0.iter().enumerate() {
            if i & 1 == 1 {
                left.push_back(*card);
            } else {
                right.push_back(*card);
            }
        }
        (Deck(left), Deck(right))
    }

    /// 按 [`DEFAULT_SHUFFLE_ROUNDS`] 轮原地洗牌
    pub fn shuffle<S: Shuffler + ?Sized>(&mut self, shuffler: &mut S) {
        self.shuffle_rounds(shuffler, DEFAULT_SHUFFLE_ROUNDS);
    }

    pub fn shuffle_rounds<S: Shuffler + ?Sized>(&mut self, shuffler: &mut S, rounds: usize) {
        // 0 张和 1 张的牌堆洗了也不变
        if self.len() < 2 {
            return;
        }
        for round in 1..=rounds {
            *self = shuffler.apply(std::mem::take(self));
            trace!(size = self.len(), round, "finished shuffle round");
        }
    }
}

// --- 类型转换 ---

impl From<Vec<Card>> for Deck {
    fn from(cards: Vec<Card>) -> Self {
        Deck(VecDeque::from(cards))
    }
}

impl FromIterator<Card> for Deck {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        Deck(iter.into_iter().collect())
    }
}

impl IntoIterator for Deck {
    type Item = Card;
    type IntoIter = vec_deque::IntoIter<Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Deck {
    type Item = &'a Card;
    type IntoIter = vec_deque::Iter<'a, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// --- 序列化 ---

/// 逗号分隔的牌面代码，例如 "10C,AD,3H"。空牌堆对应空字符串。
impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, card) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{card}")?;
        }
        Ok(())
    }
}

impl FromStr for Deck {
    type Err = WarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Deck::new());
        }
        s.split(',').map(str::parse).collect()
    }
}

// --- 单元测试 ---
