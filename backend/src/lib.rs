use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Host, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::get;
use axum::{Form, Router};
use game_core::{choose, collect_options, ChooseError, Game, GameDraft, ValidationError};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub mod config;
mod notify;
mod pages;

use config::AppConfig;
use notify::Mailer;

#[derive(Clone, Default)]
pub struct AppState {
    games: Arc<RwLock<HashMap<String, Game>>>,
    persist_path: Option<PathBuf>,
    mailer: Option<Mailer>,
}

#[derive(Debug, Clone)]
pub enum ChoiceOutcome {
    Decided { game: Game, selected: String },
    AlreadyDecided(Game),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChoiceError {
    #[error("game not found")]
    NotFound,
    #[error("invalid choice index")]
    OutOfRange,
}

impl AppState {
    pub async fn from_config(config: &AppConfig) -> Self {
        let mut state = match &config.persist_path {
            Some(path) => Self::with_persistence(path.clone()).await,
            None => Self::default(),
        };
        state.mailer = config.smtp.as_ref().and_then(Mailer::from_config);
        if state.mailer.is_none() {
            info!("mail transport not configured; reveal notifications disabled");
        }
        state
    }

    pub async fn with_persistence(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut state = Self::default();
        state.persist_path = Some(path.clone());
        if let Ok(bytes) = tokio::fs::read(&path).await {
            match serde_json::from_slice::<HashMap<String, Game>>(&bytes) {
                Ok(saved) => {
                    info!(games = saved.len(), "loaded game snapshot");
                    *state.games.write().await = saved;
                }
                Err(err) => warn!(error = %err, "could not parse game snapshot; starting empty"),
            }
        }
        state
    }

    pub async fn create(&self, draft: GameDraft) -> Result<Game, ValidationError> {
        let game = Game::new(Uuid::new_v4().to_string(), draft, self.mailer.is_some())?;
        self.games.write().await.insert(game.id.clone(), game.clone());
        self.persist().await;
        info!(game = %game.id, "created game");
        Ok(game)
    }

    pub async fn game(&self, game_id: &str) -> Option<Game> {
        self.games.read().await.get(game_id).cloned()
    }

    pub async fn all_games(&self) -> Vec<Game> {
        let games = self.games.read().await;
        let mut all: Vec<Game> = games.values().cloned().collect();
        all.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        all
    }

    // One write-lock critical section covers the lookup, the already-decided
    // check, the range check, and the state write. Two concurrent callers can
    // never both observe themselves as the one who decided.
    pub async fn finalize_choice(
        &self,
        game_id: &str,
        index: usize,
    ) -> Result<ChoiceOutcome, ChoiceError> {
        let outcome = {
            let mut games = self.games.write().await;
            let game = games.get_mut(game_id).ok_or(ChoiceError::NotFound)?;
            match choose(game, index) {
                Ok(selected) => {
                    let selected = selected.to_string();
                    ChoiceOutcome::Decided {
                        game: game.clone(),
                        selected,
                    }
                }
                Err(ChooseError::AlreadyDecided) => ChoiceOutcome::AlreadyDecided(game.clone()),
                Err(ChooseError::OutOfRange { .. }) => return Err(ChoiceError::OutOfRange),
            }
        };

        if matches!(outcome, ChoiceOutcome::Decided { .. }) {
            self.persist().await;
        }
        Ok(outcome)
    }

    fn spawn_notification(&self, game: &Game, selected: &str, result_url: String) {
        let Some(mailer) = self.mailer.clone() else {
            debug!(game = %game.id, "no mail transport configured; skipping notification");
            return;
        };
        let Some(contact) = game.creator_contact.clone() else {
            debug!(game = %game.id, "creator left no contact; skipping notification");
            return;
        };
        let title = game.title.clone();
        let selected = selected.to_string();
        tokio::spawn(async move {
            mailer
                .send_reveal(&contact, &title, &selected, &result_url)
                .await;
        });
    }

    async fn persist(&self) {
        if let Some(path) = &self.persist_path {
            let snapshot = {
                let games = self.games.read().await;
                games.clone()
            };
            match serde_json::to_vec_pretty(&snapshot) {
                Ok(json) => {
                    if let Err(err) = tokio::fs::write(path, json).await {
                        warn!(error = %err, "persist failed");
                    }
                }
                Err(err) => warn!(error = %err, "could not serialize snapshot"),
            }
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/create", get(create_page).post(create_game))
        .route("/game/:id", get(game_page).post(choose_option))
        .route("/list", get(list_games))
        .with_state(state)
}

async fn index_page() -> Html<String> {
    Html(pages::index())
}

async fn create_page() -> Html<String> {
    Html(pages::create_form())
}

#[derive(Deserialize)]
struct CreateForm {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    creator_contact: Option<String>,
    #[serde(default)]
    option_1: Option<String>,
    #[serde(default)]
    option_2: Option<String>,
    #[serde(default)]
    option_3: Option<String>,
    #[serde(default)]
    option_4: Option<String>,
}

async fn create_game(
    State(state): State<AppState>,
    Form(form): Form<CreateForm>,
) -> impl IntoResponse {
    let creator_contact = form
        .creator_contact
        .as_deref()
        .map(str::trim)
        .filter(|contact| !contact.is_empty())
        .map(str::to_string);
    let slots = [form.option_1, form.option_2, form.option_3, form.option_4];
    let draft = GameDraft {
        title: form.title.unwrap_or_default(),
        creator_contact,
        options: collect_options(slots.into_iter().flatten()),
    };

    match state.create(draft).await {
        Ok(game) => Redirect::to(&format!("/game/{}", game.id)).into_response(),
        Err(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    }
}

async fn game_page(State(state): State<AppState>, Path(game_id): Path<String>) -> impl IntoResponse {
    match state.game(&game_id).await {
        Some(game) => Html(pages::game(&game)).into_response(),
        None => (StatusCode::NOT_FOUND, "game not found").into_response(),
    }
}

#[derive(Deserialize)]
struct ChooseForm {
    #[serde(default)]
    chosen_index: Option<String>,
}

async fn choose_option(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    host: Option<Host>,
    Form(form): Form<ChooseForm>,
) -> impl IntoResponse {
    // 0-based index, parsed only here at the boundary.
    let raw = form.chosen_index.unwrap_or_default();
    let Ok(index) = raw.trim().parse::<usize>() else {
        return (StatusCode::BAD_REQUEST, "invalid choice").into_response();
    };

    match state.finalize_choice(&game_id, index).await {
        Ok(ChoiceOutcome::Decided { game, selected }) => {
            let Host(host) = host.unwrap_or_else(|| Host("localhost:3000".to_string()));
            let result_url = format!("http://{host}/game/{}", game.id);
            state.spawn_notification(&game, &selected, result_url);
            Redirect::to(&format!("/game/{game_id}")).into_response()
        }
        Ok(ChoiceOutcome::AlreadyDecided(_)) => {
            Redirect::to(&format!("/game/{game_id}")).into_response()
        }
        Err(ChoiceError::NotFound) => (StatusCode::NOT_FOUND, "game not found").into_response(),
        Err(ChoiceError::OutOfRange) => {
            (StatusCode::BAD_REQUEST, "invalid choice index").into_response()
        }
    }
}

async fn list_games(State(state): State<AppState>) -> Html<String> {
    Html(pages::list(&state.all_games().await))
}
