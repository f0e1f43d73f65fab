pub mod beck;
pub mod contents;
pub mod cravings;
pub mod exercise_sessions;
pub mod exercises;
pub mod gamification;
pub mod patient_sessions;
pub mod sessions;
pub mod strategies;
pub mod users;

pub use beck::*;
pub use contents::*;
pub use cravings::*;
pub use exercise_sessions::*;
pub use exercises::*;
pub use gamification::*;
pub use patient_sessions::*;
pub use sessions::*;
pub use strategies::*;
pub use users::*;
