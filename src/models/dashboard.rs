use serde::{Deserialize, Serialize};

use crate::gamification::Badge;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BadgeView {
    pub badge: Badge,
    pub description: String,
}

impl From<Badge> for BadgeView {
    fn from(badge: Badge) -> Self {
        Self {
            badge,
            description: badge.description().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SessionCounts {
    pub assigned: i64,
    pub done: i64,
    pub skipped: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Dashboard {
    pub user_id: i64,
    pub points: i64,
    pub level: i64,
    pub points_to_next_level: i64,
    pub craving_entries: i64,
    pub average_craving_last_7_days: Option<f64>,
    pub beck_analyses: i64,
    pub strategies: i64,
    pub sessions: SessionCounts,
    pub badges: Vec<BadgeView>,
}
