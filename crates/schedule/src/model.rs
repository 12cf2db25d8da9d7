use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
    Postponed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub score: Option<u32>,
}

impl Team {
    /// A score is only shown once a match has one; `null` renders nothing.
    pub fn has_score(&self) -> bool {
        self.score.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub time: String,
    pub team1: Team,
    pub team2: Team,
    pub venue: String,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<MatchDetails>,
}

impl Match {
    pub fn title(&self) -> String {
        format!("{} vs {}", self.team1.name, self.team2.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetails {
    pub stats: StatsBlock,
    pub prediction: PredictionBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsBlock {
    pub title: String,
    #[serde(default)]
    pub content: Vec<String>,
}

/// Authored prediction text shown in the match dialog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionBlock {
    pub title: String,
    pub analysis: String,
    #[serde(default)]
    pub key_predictions: Vec<KeyPrediction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeyPrediction {
    pub label: String,
    pub value: String,
    pub odds: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmaker_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmaker_logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub day_label_key: String,
    #[serde(default)]
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchCardLabels {
    pub scheduled: String,
    pub live: String,
    pub finished: String,
    pub postponed: String,
    pub venue: String,
    pub time: String,
    pub vs: String,
}

impl MatchCardLabels {
    pub fn status_label(&self, status: MatchStatus) -> &str {
        match status {
            MatchStatus::Scheduled => &self.scheduled,
            MatchStatus::Live => &self.live,
            MatchStatus::Finished => &self.finished,
            MatchStatus::Postponed => &self.postponed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchDialogLabels {
    pub title: String,
    pub stats_title: String,
    pub prediction_title: String,
    pub close_button: String,
    pub no_details: String,
    pub prediction_column: String,
    pub outcome_column: String,
    pub odds_column: String,
    pub bookmaker_column: String,
}

/// Everything the schedule page renders in one language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePage {
    pub meta_title: String,
    pub meta_description: String,
    pub page_title: String,
    pub select_day_prompt: String,
    pub no_matches_message: String,
    pub match_card: MatchCardLabels,
    pub match_dialog: MatchDialogLabels,
    #[serde(default)]
    pub day_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub schedule: Vec<DaySchedule>,
}

impl SchedulePage {
    /// Localized tab label, or the ISO date when the key has no label.
    pub fn day_label(&self, day: &DaySchedule) -> String {
        self.day_labels
            .get(&day.day_label_key)
            .cloned()
            .unwrap_or_else(|| day.date.format("%Y-%m-%d").to_string())
    }

    /// The tab selected when the page opens.
    pub fn default_day(&self) -> Option<&DaySchedule> {
        self.schedule.first()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DaySchedule> {
        self.schedule.iter().find(|day| day.date == date)
    }

    pub fn find_match(&self, id: &str) -> Option<(&DaySchedule, &Match)> {
        self.schedule.iter().find_map(|day| {
            day.matches
                .iter()
                .find(|fixture| fixture.id == id)
                .map(|fixture| (day, fixture))
        })
    }

    pub fn day_view(&self, day: &DaySchedule) -> DayView {
        DayView {
            date: day.date,
            label: self.day_label(day),
            empty_message: day
                .matches
                .is_empty()
                .then(|| self.no_matches_message.clone()),
            matches: day
                .matches
                .iter()
                .map(|fixture| self.match_view(fixture))
                .collect(),
        }
    }

    pub fn match_view(&self, fixture: &Match) -> MatchView {
        MatchView {
            fixture: fixture.clone(),
            status_label: self.match_card.status_label(fixture.status).to_string(),
            title: fixture.title(),
            details_message: fixture
                .details
                .is_none()
                .then(|| self.match_dialog.no_details.clone()),
        }
    }
}

/// One schedule tab with labels already resolved.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub date: NaiveDate,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
    pub matches: Vec<MatchView>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    #[serde(flatten)]
    pub fixture: Match,
    pub status_label: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_message: Option<String>,
}
