//! AI and session configuration

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::board::Mark;
use crate::search::FULL_DEPTH;
use crate::session::Side;

/// Skill tier of the automated player
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Random empty cell
    Easy,
    /// Win, block, centre, corner, edge
    #[default]
    Medium,
    /// Full alpha-beta search
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Search depth limit for this tier
    pub fn max_depth(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 3,
            Difficulty::Hard => FULL_DEPTH,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => anyhow::bail!("Unknown difficulty: {} (expected easy, medium or hard)", other),
        }
    }
}

/// How the search picks among equally scored best moves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// Lowest cell index (fully reproducible play)
    #[default]
    First,
    /// Uniform among all best moves, drawn from the selector's RNG
    Random,
}

/// Automated player configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub difficulty: Difficulty,
    /// Overrides the tier's search depth for the search policy
    pub max_depth: Option<u32>,
    pub tie_break: TieBreak,
    /// Random seed for reproducibility (None = entropy)
    pub seed: Option<u64>,
}

impl AiConfig {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Default::default()
        }
    }

    /// Depth cap the search runs with
    pub fn search_depth(&self) -> u32 {
        self.max_depth.unwrap_or_else(|| self.difficulty.max_depth())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

/// Everything a session needs before the first move
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Mark of the human side; the automated side plays the other one
    pub player_mark: Mark,
    /// Who moves first in every game of the session
    pub first: Side,
    pub ai: AiConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            player_mark: Mark::X,
            first: Side::Player,
            ai: AiConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn ai_mark(&self) -> Mark {
        self.player_mark.opponent()
    }

    pub fn with_ai(mut self, ai: AiConfig) -> Self {
        self.ai = ai;
        self
    }

    pub fn with_first(mut self, first: Side) -> Self {
        self.first = first;
        self
    }

    pub fn with_player_mark(mut self, mark: Mark) -> Self {
        self.player_mark = mark;
        self
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config JSON: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
