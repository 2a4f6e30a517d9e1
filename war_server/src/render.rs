//! HTML 渲染
//!
//! 页面由 htmx 驱动：按钮向牌局路由发 POST 请求，并用返回的 `#game` 片段原地替换。

use axum::http::StatusCode;
use std::fmt::Write;
use war_core::{Card, GameView, Phase, PlayerView, Role};

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.4";

pub fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/public/style.css">
<script src="{HTMX_SRC}"></script>
</head>
<body>
<main id="content">
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn home() -> String {
    layout(
        "War",
        r##"<h1>War</h1>
<p>Two players, one deck. Higher card takes both.</p>
<button hx-post="/game" hx-target="#content" hx-swap="innerHTML">New game</button>"##,
    )
}

pub fn game_page(view: &GameView) -> String {
    layout(&format!("War #{}", view.game_id), &game(view))
}

/// `#game` 片段，定时轮询自身，让双方都能看到对方的翻牌
pub fn game(view: &GameView) -> String {
    let id = view.game_id;
    let mut html = String::new();
    let _ = writeln!(
        html,
        r##"<div id="game" hx-get="/game/{id}" hx-trigger="every 2s" hx-select="#game" hx-swap="outerHTML">"##
    );
    let _ = writeln!(html, "<h1>Game {id}</h1>");
    let _ = writeln!(html, "<p class=\"phase\">{}</p>", phase_label(view));

    // 观察者自己的座位放在最后，紧挨翻牌按钮
    let (top, bottom) = match view.viewer {
        Some(Role::Host) | None => (Role::Guest, Role::Host),
        Some(Role::Guest) => (Role::Host, Role::Guest),
    };
    html.push_str(&seat(view.seat(top), view.viewer));
    html.push_str(&seat(view.seat(bottom), view.viewer));

    if let Some(role) = view.viewer {
        if view.seat(role).can_flip {
            let _ = writeln!(
                html,
                r##"<button hx-post="/game/{id}/flip" hx-target="#game" hx-swap="outerHTML">Flip</button>"##
            );
        }
    }
    if view.can_join() {
        let _ = writeln!(
            html,
            r##"<button hx-post="/game/{id}/join" hx-target="#game" hx-swap="outerHTML">Join as guest</button>"##
        );
    }
    html.push_str("</div>\n");
    html
}

fn phase_label(view: &GameView) -> String {
    match view.phase {
        Phase::Idle => "Waiting for the next battle".to_string(),
        Phase::Battling => "Battle!".to_string(),
        Phase::War => "War!".to_string(),
        Phase::Over { winner } if view.viewer == Some(winner) => "You won!".to_string(),
        Phase::Over { winner } if view.viewer.is_some() => format!("You lost, the {winner} won."),
        Phase::Over { winner } => format!("Game over, the {winner} won."),
    }
}

fn seat(player: &PlayerView, viewer: Option<Role>) -> String {
    let who = if viewer == Some(player.role) {
        "You".to_string()
    } else if player.seated {
        format!("The {}", player.role)
    } else {
        format!("The {} (open seat)", player.role)
    };

    let mut html = String::new();
    let _ = writeln!(html, r#"<section class="seat {}">"#, player.role);
    let _ = writeln!(
        html,
        "<h2>{who}</h2>\n<p>{} in hand, {} won, {} total</p>",
        player.hand, player.won, player.total
    );
    if !player.battling.is_empty() {
        html.push_str("<div class=\"battleground\">");
        for card in &player.battling {
            html.push_str(&card_html(card));
        }
        html.push_str("</div>\n");
    }
    if player.supporting > 0 {
        let _ = writeln!(
            html,
            r#"<div class="warzone">{} cards face down</div>"#,
            player.supporting
        );
    }
    html.push_str("</section>\n");
    html
}

fn card_html(card: &Card) -> String {
    format!(
        r#"<span class="card" data-slug="{}" title="{}">{}</span>"#,
        card.slug(),
        card.name(),
        card.slug()
    )
}

pub fn error_fragment(status: StatusCode, message: &str) -> String {
    format!(
        "<div class=\"error\" role=\"alert\"><strong>{}</strong> {}</div>\n",
        status.as_u16(),
        escape(message)
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use war_core::{Game, Player, SessionId};

    fn game_with(host: &str, guest: &str, guest_seated: bool) -> Game {
        Game::new(
            5,
            Player::new(Role::Host, host.parse().unwrap(), Some(SessionId("h".into()))),
            Player::new(
                Role::Guest,
                guest.parse().unwrap(),
                guest_seated.then(|| SessionId("g".into())),
            ),
        )
    }

    #[test]
    fn test_host_sees_flip_button() {
        let g = game_with("2C,3C", "2D,3D", false);
        let html = game(&GameView::new(&g, Some(Role::Host)));
        assert!(html.contains(r#"hx-post="/game/5/flip""#));
        assert!(!html.contains("/join"));
        assert!(html.contains("The guest (open seat)"));
    }

    #[test]
    fn test_spectator_sees_join_button() {
        let g = game_with("2C,3C", "2D,3D", false);
        let html = game(&GameView::new(&g, None));
        assert!(html.contains(r#"hx-post="/game/5/join""#));
        assert!(!html.contains("/flip"));
    }

    #[test]
    fn test_battling_cards_and_warzone() {
        let mut g = game_with("5C,2C,3C,4C,6C", "5D,2D,3D,4D,7D", true);
        g.flip(Role::Host).unwrap();
        g.flip(Role::Guest).unwrap();
        let html = game(&GameView::new(&g, Some(Role::Guest)));
        assert!(html.contains("War!"));
        assert!(html.contains(r#"title="Five of Clubs""#));

        g.flip(Role::Host).unwrap();
        let html = game(&GameView::new(&g, Some(Role::Guest)));
        assert!(html.contains("3 cards face down"));
        assert!(html.contains(r#"data-slug="6C""#));
    }

    #[test]
    fn test_winner_banner() {
        let mut g = game_with("AC", "2D", true);
        g.flip(Role::Host).unwrap();
        g.flip(Role::Guest).unwrap();
        assert!(game(&GameView::new(&g, Some(Role::Host))).contains("You won!"));
        assert!(game(&GameView::new(&g, Some(Role::Guest))).contains("You lost, the host won."));
        assert!(game(&GameView::new(&g, None)).contains("Game over, the host won."));
    }

    #[test]
    fn test_error_fragment_escapes() {
        let html = error_fragment(StatusCode::BAD_REQUEST, "<b>bad</b> & worse");
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt; &amp; worse"));
        assert!(html.contains("400"));
    }

    #[test]
    fn test_home_posts_new_game() {
        assert!(home().contains(r#"hx-post="/game""#));
    }
}
