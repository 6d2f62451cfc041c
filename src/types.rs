use crate::constants::{STARTERS, STARTER_LEVEL};
use crate::utils::title_case;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

/// A user of the messaging platform
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<@{}>", self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<serenity::model::id::UserId> for UserId {
    fn from(id: serenity::model::id::UserId) -> Self {
        Self(id.0.to_string())
    }
}

/// The pokemon a user owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatureRecord {
    pub species: String,
    pub level: u8,
}

impl CreatureRecord {
    pub fn starter(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            level: STARTER_LEVEL,
        }
    }

    #[inline]
    pub fn display_name(&self) -> String {
        title_case(&self.species)
    }
}

/// An event delivered by the messaging platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Text {
        user: UserId,
        text: String,
    },
    Action {
        user: UserId,
        action_id: String,
        value: String,
    },
}

impl Incoming {
    /// Parse a typed command.
    /// `!choose_bulbasaur` or `!move_0` are actions like a button click would send,
    /// anything else is a plain text message.
    pub fn from_command(user: UserId, command: &str) -> Self {
        let command = command.trim();

        match command.strip_prefix('!') {
            Some(action) => {
                let mut parts = action.splitn(2, char::is_whitespace);
                let action_id = parts.next().unwrap_or_default().to_owned();
                let value = parts.next().unwrap_or_default().trim().to_owned();

                Self::Action {
                    user,
                    action_id,
                    value,
                }
            }

            None => Self::Text {
                user,
                text: command.to_owned(),
            },
        }
    }

    pub fn user(&self) -> &UserId {
        match self {
            Self::Text { user, .. } | Self::Action { user, .. } => user,
        }
    }
}

/// The text messages the bot reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Choose,
    Challenge,
}

impl Trigger {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "choose" => Some(Self::Choose),
            "challenge" => Some(Self::Challenge),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ChooseStarter(String),
    SelectMove(usize),
    Run,
}

impl Action {
    /// The value of a `choose_` action wins over the species in its id.
    /// Only the starters can be chosen.
    pub fn parse(action_id: &str, value: &str) -> Option<Self> {
        lazy_static! {
            static ref CHOOSE_RE: Regex = Regex::new(r"^choose_([a-z0-9-]+)$").unwrap();
            static ref MOVE_RE: Regex = Regex::new(r"^move_(\d+)$").unwrap();
        }

        let action_id = action_id.trim();

        if action_id == "run" {
            return Some(Self::Run);
        }

        if let Some(caps) = MOVE_RE.captures(action_id) {
            return caps[1].parse().ok().map(Self::SelectMove);
        }

        let caps = CHOOSE_RE.captures(action_id)?;
        let value = value.trim().to_lowercase();
        let species = if value.is_empty() { &caps[1] } else { value.as_str() };

        STARTERS
            .iter()
            .find(|(name, _)| *name == species)
            .map(|(name, _)| Self::ChooseStarter((*name).to_owned()))
    }

    pub fn action_id(&self) -> String {
        match self {
            Self::ChooseStarter(species) => format!("choose_{}", species),
            Self::SelectMove(index) => format!("move_{}", index),
            Self::Run => String::from("run"),
        }
    }
}

/// A labeled choice the user can pick, rendered as a button or a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub action_id: String,
}

/// What the bot wants to show, the adapters decide how
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presentation {
    pub text: String,
    pub image: Option<String>,
    pub choices: Vec<Choice>,
}

impl Presentation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    pub fn with_choice(mut self, label: impl Into<String>, action: &Action) -> Self {
        self.choices.push(Choice {
            label: label.into(),
            action_id: action.action_id(),
        });

        self
    }
}

impl fmt::Display for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)?;

        if let Some(image) = &self.image {
            write!(f, "\n[{}]", image)?;
        }

        for choice in &self.choices {
            write!(f, "\n  !{:<20} {}", choice.action_id, choice.label)?;
        }

        Ok(())
    }
}
