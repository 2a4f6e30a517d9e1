//! 洗牌策略
//!
//! 随机性一律通过 [`RandomSource`] 注入：测试用 [`FixedSource`] 固定洗牌结果，
//! 正式运行时使用由操作系统播种的随机数生成器。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::deck::Deck;

/// 产生 `[0.0, 1.0)` 区间内的值
pub trait RandomSource {
    fn next_unit(&mut self) -> f32;
}

/// 总是返回同一个值。`FixedSource(0.0)` 让每次鸽尾洗牌都优先从左半边取牌。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSource(pub f32);

impl RandomSource for FixedSource {
    fn next_unit(&mut self) -> f32 {
        self.0
    }
}

/// 适配任意 `rand` 随机数生成器
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        RngSource(rng)
    }
}

impl RngSource<StdRng> {
    pub fn from_os_rng() -> Self {
        RngSource(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        RngSource(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f32 {
        self.0.random::<f32>()
    }
}

/// 一轮洗牌。结果必须是输入的一个排列。
pub trait Shuffler {
    fn apply(&mut self, deck: Deck) -> Deck;
}

/// 鸽尾式洗牌 (Riffle) 的近似：先把牌切成两半，再交错合并，
/// 每张牌取自随机源选中的那一半。
///
/// See <https://en.wikipedia.org/wiki/Riffle_shuffle_permutation>.
#[derive(Debug, Clone)]
pub struct RiffleShuffler<R> {
    random: R,
}

impl<R: RandomSource> RiffleShuffler<R> {
    pub fn new(random: R) -> Self {
        RiffleShuffler { random }
    }
}

impl<R: RandomSource> Shuffler for RiffleShuffler<R> {
    fn apply(&mut self, deck: Deck) -> Deck {
        let total = deck.len();
        let (left, right) = deck.cut();
        let mut left = left.into_iter().peekable();
        let mut right = right.into_iter().peekable();
        let mut merged = Vec::with_capacity(total);

        loop {
            let next = match (left.peek().is_some(), right.peek().is_some()) {
                (true, true) => {
                    if self.random.next_unit() < 0.5 {
                        left.next()
                    } else {
                        right.next()
                    }
                }
                (true, false) => left.next(),
                (false, true) => right.next(),
                (false, false) => break,
            };
            merged.extend(next);
        }

        Deck::from(merged)
    }
}
