use std::collections::HashSet;

use once_cell::sync::Lazy;
use predictpal_core::Language;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ScheduleError;
use crate::model::SchedulePage;

const CLUB_WORLD_CUP_YAML: &str = include_str!("../content/club_world_cup.yaml");

static CATALOGUE: Lazy<Result<Catalogue, ScheduleError>> =
    Lazy::new(|| Catalogue::from_yaml(CLUB_WORLD_CUP_YAML));

/// The embedded club tournament schedule, parsed and checked on first use.
pub fn catalogue() -> Result<&'static Catalogue, ScheduleError> {
    CATALOGUE.as_ref().map_err(Clone::clone)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalogue {
    pub en: SchedulePage,
    pub es: SchedulePage,
}

impl Catalogue {
    pub fn from_yaml(source: &str) -> Result<Self, ScheduleError> {
        let catalogue: Catalogue =
            serde_yaml::from_str(source).map_err(|err| ScheduleError::Parse(err.to_string()))?;
        catalogue.check()?;
        debug!(
            days = catalogue.en.schedule.len(),
            matches = catalogue
                .en
                .schedule
                .iter()
                .map(|day| day.matches.len())
                .sum::<usize>(),
            "schedule catalogue loaded"
        );
        Ok(catalogue)
    }

    pub fn page(&self, language: Language) -> &SchedulePage {
        match language {
            Language::En => &self.en,
            Language::Es => &self.es,
        }
    }

    /// Both languages must describe the same fixtures in the same order.
    fn check(&self) -> Result<(), ScheduleError> {
        for language in Language::ALL {
            let page = self.page(language);
            let mut seen = HashSet::new();
            for fixture in page.schedule.iter().flat_map(|day| &day.matches) {
                if !seen.insert(fixture.id.as_str()) {
                    return Err(ScheduleError::Inconsistent(format!(
                        "duplicate match id `{}` in `{language}` schedule",
                        fixture.id
                    )));
                }
            }
        }

        let (en, es) = (&self.en.schedule, &self.es.schedule);
        if en.len() != es.len() {
            return Err(ScheduleError::Inconsistent(format!(
                "`en` has {} days but `es` has {}",
                en.len(),
                es.len()
            )));
        }

        for (en_day, es_day) in en.iter().zip(es) {
            if en_day.date != es_day.date {
                return Err(ScheduleError::Inconsistent(format!(
                    "day order differs: `en` has {} where `es` has {}",
                    en_day.date, es_day.date
                )));
            }
            let en_ids: Vec<&str> = en_day.matches.iter().map(|m| m.id.as_str()).collect();
            let es_ids: Vec<&str> = es_day.matches.iter().map(|m| m.id.as_str()).collect();
            if en_ids != es_ids {
                return Err(ScheduleError::Inconsistent(format!(
                    "matches on {} differ: `en` {:?} vs `es` {:?}",
                    en_day.date, en_ids, es_ids
                )));
            }
        }

        Ok(())
    }
}
