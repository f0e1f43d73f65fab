use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const POINTS_PER_LEVEL: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    CravingLogged,
    BeckAnalysisCompleted,
    StrategySaved,
    SessionCompleted,
}

impl Activity {
    pub fn points(&self) -> i64 {
        match self {
            Activity::CravingLogged => 10,
            Activity::BeckAnalysisCompleted => 20,
            Activity::StrategySaved => 5,
            Activity::SessionCompleted => 50,
        }
    }
}

pub fn level_for_points(points: i64) -> i64 {
    points.max(0) / POINTS_PER_LEVEL + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    FirstCraving,
    CravingTracker,
    ThoughtDetective,
    Strategist,
    FirstSession,
    Committed,
    LevelFive,
}

impl Badge {
    pub const ALL: [Badge; 7] = [
        Badge::FirstCraving,
        Badge::CravingTracker,
        Badge::ThoughtDetective,
        Badge::Strategist,
        Badge::FirstSession,
        Badge::Committed,
        Badge::LevelFive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Badge::FirstCraving => "first_craving",
            Badge::CravingTracker => "craving_tracker",
            Badge::ThoughtDetective => "thought_detective",
            Badge::Strategist => "strategist",
            Badge::FirstSession => "first_session",
            Badge::Committed => "committed",
            Badge::LevelFive => "level_five",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Badge::FirstCraving => "Logged a first craving",
            Badge::CravingTracker => "Logged 7 cravings",
            Badge::ThoughtDetective => "Completed 5 Beck analyses",
            Badge::Strategist => "Saved 10 anti-craving strategies",
            Badge::FirstSession => "Completed a first exercise session",
            Badge::Committed => "Completed 10 exercise sessions",
            Badge::LevelFive => "Reached level 5",
        }
    }

    fn is_earned(&self, counts: &ActivityCounts) -> bool {
        match self {
            Badge::FirstCraving => counts.cravings >= 1,
            Badge::CravingTracker => counts.cravings >= 7,
            Badge::ThoughtDetective => counts.beck_analyses >= 5,
            Badge::Strategist => counts.strategies >= 10,
            Badge::FirstSession => counts.sessions_completed >= 1,
            Badge::Committed => counts.sessions_completed >= 10,
            Badge::LevelFive => counts.level >= 5,
        }
    }
}

impl FromStr for Badge {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Badge::ALL
            .iter()
            .copied()
            .find(|badge| badge.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown badge: {}", s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityCounts {
    pub cravings: i64,
    pub beck_analyses: i64,
    pub strategies: i64,
    pub sessions_completed: i64,
    pub level: i64,
}

pub fn earned_badges(counts: &ActivityCounts) -> Vec<Badge> {
    Badge::ALL
        .iter()
        .copied()
        .filter(|badge| badge.is_earned(counts))
        .collect()
}
