use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::state::{Game, GameId, Phase, Player, Role};

/// 座位的对外视图 (PlayerView)
/// 手牌和赢牌堆都是背面朝上的，只暴露张数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub role: Role,
    pub seated: bool,
    pub hand: usize,
    pub won: usize,
    pub total: usize,
    /// 桌面上正面朝上的牌，最早翻出的在前
    pub battling: Vec<Card>,
    /// 桌面上背面朝上的战争牌张数
    pub supporting: usize,
    pub can_flip: bool,
}

/// 某个观察者看到的牌局 (GameView)，观察者可以是入座玩家或旁观者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub game_id: GameId,
    pub phase: Phase,
    pub viewer: Option<Role>,
    pub host: PlayerView,
    pub guest: PlayerView,
}

impl GameView {
    pub fn new(game: &Game, viewer: Option<Role>) -> GameView {
        GameView {
            game_id: game.id,
            phase: game.phase(),
            viewer,
            host: player_view(game, &game.host),
            guest: player_view(game, &game.guest),
        }
    }

    pub fn seat(&self, role: Role) -> &PlayerView {
        match role {
            Role::Host => &self.host,
            Role::Guest => &self.guest,
        }
    }

    /// 客座仍空着，且观察者本人不在座位上
    pub fn can_join(&self) -> bool {
        self.viewer.is_none() && !self.guest.seated
    }
}

fn player_view(game: &Game, player: &Player) -> PlayerView {
    PlayerView {
        role: player.role,
        seated: player.session.is_some(),
        hand: player.war.hand.len(),
        won: player.won.len(),
        total: player.total_cards(),
        battling: player.war.battling.to_vec(),
        supporting: player.war.face_down(),
        can_flip: game.can_flip(player.role),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionId;

    fn game() -> Game {
        Game::new(
            9,
            Player::new(Role::Host, "2C,3C,4C".parse().unwrap(), Some(SessionId("01".into()))),
            Player::new(Role::Guest, "2D,3D,4D".parse().unwrap(), None),
        )
    }

    #[test]
    fn test_view_hides_hands() {
        let mut g = game();
        g.flip(Role::Host).unwrap();
        let view = GameView::new(&g, Some(Role::Host));

        assert_eq!(view.game_id, 9);
        assert_eq!(view.phase, Phase::Battling);
        assert_eq!(view.host.hand, 2);
        assert_eq!(view.host.battling, vec!["2C".parse::<Card>().unwrap()]);
        assert!(!view.host.can_flip);
        assert!(view.guest.can_flip);
        assert!(view.host.seated);
        assert!(!view.guest.seated);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["host"]["hand"], 2);
        assert!(json["host"].get("cards").is_none());
    }

    #[test]
    fn test_can_join_open_seat() {
        let g = game();
        assert!(GameView::new(&g, None).can_join());
        assert!(!GameView::new(&g, Some(Role::Host)).can_join());

        let mut g = game();
        g.guest.session = Some(SessionId("02".into()));
        assert!(!GameView::new(&g, None).can_join());
    }
}
