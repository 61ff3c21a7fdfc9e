use marble_model::{ChatMessage, Role};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateError {
    #[error("unknown view stage: {0}")]
    UnknownStage(String),

    #[error("unknown comparison mode: {0}")]
    UnknownMode(String),
}

/// Top-level UI mode. The four stages are mutually exclusive; switching
/// stages clears the selections the new stage does not use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStage {
    #[default]
    Overview,
    Ranking,
    DistrictSelected,
    Comparison,
}

impl ViewStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewStage::Overview => "overview",
            ViewStage::Ranking => "ranking",
            ViewStage::DistrictSelected => "district_selected",
            ViewStage::Comparison => "comparison",
        }
    }
}

impl fmt::Display for ViewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewStage {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overview" => Ok(ViewStage::Overview),
            "ranking" => Ok(ViewStage::Ranking),
            "district_selected" => Ok(ViewStage::DistrictSelected),
            "comparison" => Ok(ViewStage::Comparison),
            other => Err(StateError::UnknownStage(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    Adjacent,
    SimilarPrice,
}

impl ComparisonMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMode::Adjacent => "adjacent",
            ComparisonMode::SimilarPrice => "similar_price",
        }
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonMode {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adjacent" => Ok(ComparisonMode::Adjacent),
            "similar_price" => Ok(ComparisonMode::SimilarPrice),
            other => Err(StateError::UnknownMode(other.to_string())),
        }
    }
}

/// Diagnostic snapshot of a session, for logging and `--json` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSummary {
    pub stage: ViewStage,
    pub selected_district: Option<String>,
    pub selected_quintile: Option<u8>,
    pub comparison_mode: Option<ComparisonMode>,
    pub comparison_district_count: usize,
    pub message_count: usize,
    pub valid: bool,
}

/// Per-session UI state: current stage, selections, comparison partners and
/// chat history. Mutators report acceptance with a boolean and apply the
/// stage's clearing side effects; rejected inputs leave the state untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    stage: ViewStage,
    selected_district: Option<String>,
    selected_quintile: Option<u8>,
    comparison_mode: Option<ComparisonMode>,
    comparison_districts: Vec<String>,
    messages: Vec<ChatMessage>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> ViewStage {
        self.stage
    }

    pub fn selected_district(&self) -> Option<&str> {
        self.selected_district.as_deref()
    }

    pub fn selected_quintile(&self) -> Option<u8> {
        self.selected_quintile
    }

    pub fn comparison_mode(&self) -> Option<ComparisonMode> {
        self.comparison_mode
    }

    pub fn comparison_districts(&self) -> &[String] {
        &self.comparison_districts
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Switch the view stage, applying the stage's clearing side effects.
    ///
    /// `Comparison` requires a selected district; without one the state
    /// lands in `DistrictSelected` instead. Returns true when the stage was
    /// applied (including the downgrade case, which mirrors the host UI's
    /// redirect rather than a rejection).
    pub fn set_view_stage(&mut self, stage: ViewStage) -> bool {
        let old = self.stage;
        match stage {
            ViewStage::Overview => {
                self.stage = stage;
                self.selected_district = None;
                self.selected_quintile = None;
                self.clear_comparison();
            }
            ViewStage::Ranking => {
                self.stage = stage;
                self.selected_district = None;
                self.clear_comparison();
            }
            ViewStage::DistrictSelected => {
                self.stage = stage;
                self.clear_comparison();
            }
            ViewStage::Comparison => {
                if self.selected_district.is_none() {
                    log::warn!(
                        "comparison stage requires a selected district, \
                         staying in district_selected"
                    );
                    self.stage = ViewStage::DistrictSelected;
                } else {
                    self.stage = stage;
                }
            }
        }
        if old != self.stage {
            log::info!("view stage: {} -> {}", old, self.stage);
        }
        true
    }

    /// Select a district. Empty names are rejected.
    pub fn select_district(&mut self, name: &str) -> bool {
        if name.is_empty() {
            log::error!("rejected empty district name");
            return false;
        }
        log::info!(
            "selected district: {:?} -> {}",
            self.selected_district,
            name
        );
        self.selected_district = Some(name.to_string());
        true
    }

    pub fn clear_district(&mut self) {
        self.selected_district = None;
    }

    /// Select a price quintile (1..=5). Re-selecting the current value
    /// toggles it off.
    pub fn select_quintile(&mut self, quintile: Option<u8>) -> bool {
        if let Some(q) = quintile {
            if !(1..=5).contains(&q) {
                log::error!("rejected out-of-range quintile: {q}");
                return false;
            }
        }
        if self.selected_quintile == quintile {
            log::info!("quintile {:?} toggled off", quintile);
            self.selected_quintile = None;
        } else {
            self.selected_quintile = quintile;
        }
        true
    }

    /// Set or clear the comparison mode. Changing the mode invalidates the
    /// current partner set.
    pub fn set_comparison_mode(&mut self, mode: Option<ComparisonMode>) -> bool {
        if self.comparison_mode != mode {
            log::info!(
                "comparison mode: {:?} -> {:?}, clearing {} partner districts",
                self.comparison_mode,
                mode,
                self.comparison_districts.len()
            );
            self.comparison_districts.clear();
        }
        self.comparison_mode = mode;
        true
    }

    pub fn set_comparison_districts(&mut self, districts: Vec<String>) {
        self.comparison_districts = districts;
    }

    pub fn clear_comparison(&mut self) {
        self.comparison_mode = None;
        self.comparison_districts.clear();
    }

    /// Append a chat message. Empty content is rejected.
    pub fn add_message(&mut self, role: Role, content: &str) -> bool {
        if content.is_empty() {
            log::error!("rejected empty chat message");
            return false;
        }
        self.messages.push(ChatMessage {
            role,
            content: content.to_string(),
        });
        true
    }

    /// A state is consistent unless it claims the comparison stage without a
    /// selected district. Stage and mode values are valid by construction.
    pub fn validate(&self) -> bool {
        self.stage != ViewStage::Comparison || self.selected_district.is_some()
    }

    /// Restore consistency. Idempotent: a valid state is left untouched.
    pub fn repair(&mut self) {
        if self.stage == ViewStage::Comparison && self.selected_district.is_none() {
            log::warn!("repair: comparison stage without district, downgrading");
            self.stage = ViewStage::DistrictSelected;
        }
    }

    pub fn summary(&self) -> StateSummary {
        StateSummary {
            stage: self.stage,
            selected_district: self.selected_district.clone(),
            selected_quintile: self.selected_quintile,
            comparison_mode: self.comparison_mode,
            comparison_district_count: self.comparison_districts.len(),
            message_count: self.messages.len(),
            valid: self.validate(),
        }
    }
}
