pub mod catalogue;
pub mod error;
pub mod model;

pub use catalogue::{catalogue, Catalogue};
pub use error::ScheduleError;
pub use model::{
    DaySchedule, DayView, KeyPrediction, Match, MatchCardLabels, MatchDetails, MatchDialogLabels,
    MatchStatus, MatchView, SchedulePage, Team,
};
