use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use war_core::{deal, GameId, GameView, Player, RiffleShuffler, RngSource, Role};

use crate::error::AppError;
use crate::render;
use crate::session::{ensure_session, MaybeSession, RequireSession};
use crate::state::SharedState;
use crate::store::StoreError;

const HX_PUSH_URL: &str = "hx-push-url";

pub fn router(state: SharedState, public_dir: &std::path::Path) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/ping", get(ping))
        .route("/game", post(create_game))
        .route("/game/{id}", get(show_game))
        .route("/game/{id}/join", post(join_game))
        .route("/game/{id}/flip", post(flip))
        .route("/game/{id}/state", get(game_state))
        .nest_service("/public", ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home() -> Html<String> {
    Html(render::home())
}

async fn ping() -> &'static str {
    "pong!\n"
}

/// 新会话的 `Set-Cookie` 头
fn set_cookie(cookie: Option<String>) -> Option<[(axum::http::HeaderName, String); 1]> {
    cookie.map(|value| [(SET_COOKIE, value)])
}

/// 发一局新牌，调用者为房主
async fn create_game(
    State(state): State<SharedState>,
    MaybeSession(current): MaybeSession,
) -> Result<impl IntoResponse, AppError> {
    let (session, cookie) = ensure_session(&state, current).await?;

    let mut shuffler = RiffleShuffler::new(RngSource::from_os_rng());
    let (host_hand, guest_hand) = deal(&mut shuffler, state.shuffle_rounds);
    let host = Player::new(Role::Host, host_hand, Some(session.clone()));
    let guest = Player::new(Role::Guest, guest_hand, None);

    let game = state.with_store(move |store| store.create_game(host, guest)).await?;
    info!(game_id = game.id, session_id = %session, "created game");

    let view = GameView::new(&game, Some(Role::Host));
    Ok((
        set_cookie(cookie),
        [(HX_PUSH_URL, format!("/game/{}", game.id))],
        Html(render::game(&view)),
    ))
}

/// 渲染牌局页面
///
/// 没有会话的访客在这里获得会话，打开分享链接即可看到加入按钮。
async fn show_game(
    State(state): State<SharedState>,
    Path(id): Path<GameId>,
    MaybeSession(current): MaybeSession,
) -> Result<impl IntoResponse, AppError> {
    let game = state.with_store(move |store| store.load_game(id)).await?;
    let (session, cookie) = ensure_session(&state, current).await?;
    let view = GameView::new(&game, game.role_of(&session));
    Ok((set_cookie(cookie), Html(render::game_page(&view))))
}

async fn join_game(
    State(state): State<SharedState>,
    Path(id): Path<GameId>,
    MaybeSession(current): MaybeSession,
) -> Result<impl IntoResponse, AppError> {
    let (session, cookie) = ensure_session(&state, current).await?;

    let joining = session.clone();
    let game = state.with_store(move |store| store.join_game(id, &joining)).await?;
    let role = game.role_of(&session);
    info!(game_id = id, session_id = %session, role = ?role, "joined game");

    let view = GameView::new(&game, role);
    Ok((set_cookie(cookie), Html(render::game(&view))))
}

/// 处理翻牌请求
///
/// 读取、翻牌、保存在同一个存储事务中完成，同一局的并发翻牌不会交错。
async fn flip(
    State(state): State<SharedState>,
    Path(id): Path<GameId>,
    RequireSession(session): RequireSession,
) -> Result<Html<String>, AppError> {
    let flipper = session.clone();
    let game = state
        .with_store(move |store| {
            store.update_game(id, &mut |game| {
                let role = game.role_of(&flipper).ok_or(StoreError::NotSeated(id))?;
                let outcome = game.flip(role)?;
                info!(game_id = id, %role, ?outcome, "flipped");
                Ok(())
            })
        })
        .await?;

    if let Some(winner) = game.winner {
        info!(game_id = id, %winner, "game over");
    }
    let view = GameView::new(&game, game.role_of(&session));
    Ok(Html(render::game(&view)))
}

async fn game_state(
    State(state): State<SharedState>,
    Path(id): Path<GameId>,
    MaybeSession(session): MaybeSession,
) -> Result<Json<GameView>, AppError> {
    let game = state.with_store(move |store| store.load_game(id)).await?;
    let viewer = session.and_then(|s| game.role_of(&s));
    Ok(Json(GameView::new(&game, viewer)))
}
