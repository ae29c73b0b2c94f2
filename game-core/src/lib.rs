use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type GameId = String;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceState {
    Open,
    Revealed { index: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    pub title: String,
    pub creator_contact: Option<String>,
    pub options: Vec<String>,
    pub choice: ChoiceState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameDraft {
    pub title: String,
    pub creator_contact: Option<String>,
    pub options: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title is required")]
    EmptyTitle,
    #[error("contact address is required")]
    MissingContact,
    #[error("at least two options are required")]
    TooFewOptions { found: usize },
    #[error("at most four options are allowed")]
    TooManyOptions { found: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChooseError {
    #[error("choice already made")]
    AlreadyDecided,
    #[error("option index out of range")]
    OutOfRange { index: usize, len: usize },
}

pub fn collect_options<I, S>(slots: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    slots
        .into_iter()
        .filter_map(|slot| {
            let trimmed = slot.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect()
}

impl Game {
    pub fn new(
        id: impl Into<GameId>,
        draft: GameDraft,
        contact_required: bool,
    ) -> Result<Self, ValidationError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if contact_required && draft.creator_contact.is_none() {
            return Err(ValidationError::MissingContact);
        }
        if draft.options.len() < MIN_OPTIONS {
            return Err(ValidationError::TooFewOptions {
                found: draft.options.len(),
            });
        }
        if draft.options.len() > MAX_OPTIONS {
            return Err(ValidationError::TooManyOptions {
                found: draft.options.len(),
            });
        }

        Ok(Self {
            id: id.into(),
            title: title.to_string(),
            creator_contact: draft.creator_contact,
            options: draft.options,
            choice: ChoiceState::Open,
        })
    }

    pub fn chosen_index(&self) -> Option<usize> {
        match self.choice {
            ChoiceState::Revealed { index } => Some(index),
            ChoiceState::Open => None,
        }
    }

    pub fn chosen_option(&self) -> Option<&str> {
        self.chosen_index().map(|index| self.options[index].as_str())
    }

    pub fn is_decided(&self) -> bool {
        matches!(self.choice, ChoiceState::Revealed { .. })
    }
}

pub fn choose(game: &mut Game, index: usize) -> Result<&str, ChooseError> {
    if game.is_decided() {
        return Err(ChooseError::AlreadyDecided);
    }

    if index >= game.options.len() {
        return Err(ChooseError::OutOfRange {
            index,
            len: game.options.len(),
        });
    }

    // The record is terminal from here on.
    game.choice = ChoiceState::Revealed { index };
    Ok(game.options[index].as_str())
}
