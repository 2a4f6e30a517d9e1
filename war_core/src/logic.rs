use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::card::Card;
use crate::deck::Deck;
use crate::error::WarError;
use crate::shuffle::Shuffler;
use crate::state::{Game, Role};

/// 每次战争在明牌之前押下的暗牌数
pub const MAX_SUPPORTING: usize = 3;

/// 一方玩家的牌局状态 (War)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct War {
    /// 手牌，牌顶在前
    pub hand: Deck,
    /// 明牌，最后一张参与比较
    pub battling: Deck,
    /// 每次战争押下的暗牌组，最早的在前
    pub supporting: Vec<Deck>,
}

impl War {
    /// 从手牌顶部出牌
    ///
    /// - 桌上还没有明牌时，只翻一张。
    /// - 否则是战争下注：至多 [`MAX_SUPPORTING`] 张暗牌组成新的一组，下一张作为明牌。
    /// - 手牌不足时有多少押多少，但总会留一张作明牌。
    pub fn flip(&mut self) -> Result<Card, WarError> {
        if self.battling.is_empty() {
            let card = self.hand.draw().ok_or(WarError::EmptyHand)?;
            self.battling.push(card);
            return Ok(card);
        }

        let take = self.hand.len().min(MAX_SUPPORTING + 1);
        let mut committed = self.hand.take_top(take);
        let card = committed.pop().ok_or(WarError::EmptyHand)?;
        if !committed.is_empty() {
            self.supporting.push(committed);
        }
        self.battling.push(card);
        Ok(card)
    }

    pub fn face_up(&self) -> Option<&Card> {
        self.battling.last()
    }

    pub fn face_down(&self) -> usize {
        self.supporting.iter().map(Deck::len).sum()
    }

    /// 这一方当前在桌上的牌数
    pub fn contested(&self) -> usize {
        self.battling.len() + self.face_down()
    }

    /// 先把明牌、再把暗牌移到 `pile`，返回移动的张数
    fn surrender_into(&mut self, pile: &mut Deck) -> usize {
        let moved = self.contested();
        pile.append(&mut self.battling);
        for mut batch in self.supporting.drain(..) {
            pile.append(&mut batch);
        }
        moved
    }
}

/// 一次翻牌的结果 (FlipOutcome)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipOutcome {
    /// 牌已翻出，等待对手
    Waiting { card: Card },
    /// 明牌点数相同，战争开始
    Tie { card: Card },
    /// 比较结束，`winner` 赢得 `cards` 张牌
    Won { card: Card, winner: Role, cards: usize },
    /// 一方在战争中无牌可出，认输交出桌上所有牌
    Forfeit { winner: Role, cards: usize },
    /// 双方在战争中同时无牌，各自收回自己的牌
    Draw { card: Card },
}

/// 发牌：新建一副牌，洗牌后切成房主和客人的两份手牌
pub fn deal<S: Shuffler + ?Sized>(shuffler: &mut S, rounds: usize) -> (Deck, Deck) {
    let mut deck = Deck::standard();
    deck.shuffle_rounds(shuffler, rounds);
    deck.cut()
}

// --- 核心游戏流程函数 ---

impl Game {
    /// 处理 `role` 的一次翻牌
    ///
    /// 双方都翻过牌后立即结算本轮对战。
    pub fn flip(&mut self, role: Role) -> Result<FlipOutcome, WarError> {
        if let Some(winner) = self.winner {
            return Err(WarError::GameOver { winner });
        }
        if !self.can_flip(role) {
            return Err(WarError::AlreadyFlipped { role });
        }

        let player = self.player_mut(role);
        if player.war.hand.is_empty() {
            if !player.war.battling.is_empty() {
                // 无法应战
                return Ok(self.forfeit(role));
            }
            player.war.hand.append(&mut player.won);
            debug!(game_id = self.id, %role, cards = self.player(role).war.hand.len(), "recycled won pile into hand");
        }

        let card = self.player_mut(role).war.flip()?;
        let (me, other) = self.seats_mut(role);
        if me.war.battling.len() != other.war.battling.len() {
            return Ok(FlipOutcome::Waiting { card });
        }
        Ok(self.resolve(card))
    }

    fn resolve(&mut self, card: Card) -> FlipOutcome {
        let (Some(host), Some(guest)) = (self.host.war.face_up().copied(), self.guest.war.face_up().copied()) else {
            return FlipOutcome::Waiting { card };
        };

        match host.value.cmp(&guest.value) {
            Ordering::Greater => self.won(card, Role::Host),
            Ordering::Less => self.won(card, Role::Guest),
            Ordering::Equal => self.tie(card),
        }
    }

    fn won(&mut self, card: Card, winner: Role) -> FlipOutcome {
        let cards = self.award(winner);
        debug!(game_id = self.id, %winner, cards, "battle resolved");
        FlipOutcome::Won { card, winner, cards }
    }

    fn tie(&mut self, card: Card) -> FlipOutcome {
        let host_out = self.host.war.hand.is_empty();
        let guest_out = self.guest.war.hand.is_empty();
        match (host_out, guest_out) {
            (false, false) => {
                debug!(game_id = self.id, value = card.value.0, "tie, war begins");
                FlipOutcome::Tie { card }
            }
            (true, false) => self.forfeit(Role::Host),
            (false, true) => self.forfeit(Role::Guest),
            (true, true) => {
                for player in [&mut self.host, &mut self.guest] {
                    player.war.surrender_into(&mut player.won);
                }
                debug!(game_id = self.id, "both sides exhausted during war, contested cards returned");
                FlipOutcome::Draw { card }
            }
        }
    }

    fn forfeit(&mut self, loser: Role) -> FlipOutcome {
        let winner = loser.opponent();
        let cards = self.award(winner);
        debug!(game_id = self.id, %loser, cards, "forfeited war");
        FlipOutcome::Forfeit { winner, cards }
    }

    /// 把桌上所有牌判给 `winner`：先输家的牌，再赢家自己的牌
    fn award(&mut self, winner: Role) -> usize {
        let (w, l) = self.seats_mut(winner);
        let mut cards = l.war.surrender_into(&mut w.won);
        cards += w.war.surrender_into(&mut w.won);

        if self.player(winner.opponent()).total_cards() == 0 {
            self.winner = Some(winner);
            debug!(game_id = self.id, %winner, "game over");
        }
        cards
    }
}

// --- 单元测试 ---
