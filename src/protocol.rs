//! Timing protocols for exercise sessions.
//!
//! Every protocol reduces to a closed-form total/work/rest split and to an
//! ordered list of [`Phase`]s that the [`crate::timer::IntervalTimer`] walks
//! through. The phase list always sums to the closed-form total.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const MAX_PHASE_SECONDS: u32 = 3600;
const MAX_COUNT: u32 = 100;
const MAX_MINUTES: u32 = 180;

const MINUTE: u32 = 60;
const TWO_MINUTES: u32 = 120;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("{protocol} session has a total duration of zero")]
    EmptySession { protocol: ProtocolKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtocolKind {
    Hiit,
    Tabata,
    Hict,
    Emom,
    E2mom,
    DeathBy,
    Amrap,
}

impl ProtocolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolKind::Hiit => "HIIT",
            ProtocolKind::Tabata => "TABATA",
            ProtocolKind::Hict => "HICT",
            ProtocolKind::Emom => "EMOM",
            ProtocolKind::E2mom => "E2MOM",
            ProtocolKind::DeathBy => "DEATH_BY",
            ProtocolKind::Amrap => "AMRAP",
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn one() -> u32 {
    1
}

fn default_seconds_per_rep() -> u32 {
    3
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiitParams {
    pub work_seconds: u32,
    pub rest_seconds: u32,
    pub rounds: u32,
    #[serde(default = "one")]
    pub exercise_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabataParams {
    pub work_seconds: u32,
    pub rest_seconds: u32,
    pub cycles: u32,
    pub sets: u32,
    pub set_rest_seconds: u32,
}

impl Default for TabataParams {
    fn default() -> Self {
        Self {
            work_seconds: 20,
            rest_seconds: 10,
            cycles: 8,
            sets: 1,
            set_rest_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HictParams {
    pub work_seconds: u32,
    pub rest_seconds: u32,
    pub exercise_count: u32,
    pub rounds: u32,
    pub round_rest_seconds: u32,
}

impl Default for HictParams {
    fn default() -> Self {
        Self {
            work_seconds: 30,
            rest_seconds: 10,
            exercise_count: 8,
            rounds: 3,
            round_rest_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmomParams {
    pub total_minutes: u32,
    pub reps_per_minute: u32,
    #[serde(default = "default_seconds_per_rep")]
    pub seconds_per_rep: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct E2momParams {
    pub total_minutes: u32,
    pub reps_per_interval: u32,
    #[serde(default = "default_seconds_per_rep")]
    pub seconds_per_rep: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathByParams {
    pub max_minutes: u32,
    #[serde(default = "one")]
    pub starting_reps: u32,
    #[serde(default = "one")]
    pub rep_increment: u32,
    #[serde(default = "default_seconds_per_rep")]
    pub seconds_per_rep: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmrapParams {
    pub total_minutes: u32,
}

/// A protocol configuration as submitted by the session builder, tagged by
/// its `"protocol"` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Protocol {
    Hiit(HiitParams),
    Tabata(TabataParams),
    Hict(HictParams),
    Emom(EmomParams),
    E2mom(E2momParams),
    DeathBy(DeathByParams),
    Amrap(AmrapParams),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Work,
    Rest,
    Recovery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub kind: PhaseKind,
    pub seconds: u32,
    pub round: u32,
}

impl Phase {
    fn work(seconds: u32, round: u32) -> Self {
        Self {
            kind: PhaseKind::Work,
            seconds,
            round,
        }
    }

    fn rest(seconds: u32, round: u32) -> Self {
        Self {
            kind: PhaseKind::Rest,
            seconds,
            round,
        }
    }

    fn recovery(seconds: u32, round: u32) -> Self {
        Self {
            kind: PhaseKind::Recovery,
            seconds,
            round,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSummary {
    pub protocol: ProtocolKind,
    pub total_seconds: u32,
    pub work_seconds: u32,
    pub rest_seconds: u32,
    pub intensity_percent: u8,
    pub rounds: u32,
}

fn check(name: &'static str, value: u32, min: u32, max: u32) -> Result<(), ProtocolError> {
    if value < min || value > max {
        return Err(ProtocolError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Rounded `work / total` as a whole percentage.
pub fn intensity_percent(work_seconds: u32, total_seconds: u32) -> u8 {
    if total_seconds == 0 {
        return 0;
    }
    let work = u64::from(work_seconds.min(total_seconds));
    let total = u64::from(total_seconds);
    ((work * 100 + total / 2) / total) as u8
}

fn capped_work(reps: u32, seconds_per_rep: u32, window: u32) -> u32 {
    reps.saturating_mul(seconds_per_rep).min(window)
}

impl Protocol {
    pub fn kind(&self) -> ProtocolKind {
        match self {
            Protocol::Hiit(_) => ProtocolKind::Hiit,
            Protocol::Tabata(_) => ProtocolKind::Tabata,
            Protocol::Hict(_) => ProtocolKind::Hict,
            Protocol::Emom(_) => ProtocolKind::Emom,
            Protocol::E2mom(_) => ProtocolKind::E2mom,
            Protocol::DeathBy(_) => ProtocolKind::DeathBy,
            Protocol::Amrap(_) => ProtocolKind::Amrap,
        }
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Protocol::Hiit(p) => {
                check("work_seconds", p.work_seconds, 1, MAX_PHASE_SECONDS)?;
                check("rest_seconds", p.rest_seconds, 0, MAX_PHASE_SECONDS)?;
                check("rounds", p.rounds, 1, MAX_COUNT)?;
                check("exercise_count", p.exercise_count, 1, MAX_COUNT)?;
            }
            Protocol::Tabata(p) => {
                check("work_seconds", p.work_seconds, 1, MAX_PHASE_SECONDS)?;
                check("rest_seconds", p.rest_seconds, 0, MAX_PHASE_SECONDS)?;
                check("cycles", p.cycles, 1, MAX_COUNT)?;
                check("sets", p.sets, 1, MAX_COUNT)?;
                check("set_rest_seconds", p.set_rest_seconds, 0, MAX_PHASE_SECONDS)?;
            }
            Protocol::Hict(p) => {
                check("work_seconds", p.work_seconds, 1, MAX_PHASE_SECONDS)?;
                check("rest_seconds", p.rest_seconds, 0, MAX_PHASE_SECONDS)?;
                check("exercise_count", p.exercise_count, 1, MAX_COUNT)?;
                check("rounds", p.rounds, 1, MAX_COUNT)?;
                check("round_rest_seconds", p.round_rest_seconds, 0, MAX_PHASE_SECONDS)?;
            }
            Protocol::Emom(p) => {
                check("total_minutes", p.total_minutes, 1, MAX_MINUTES)?;
                check("reps_per_minute", p.reps_per_minute, 1, MAX_COUNT)?;
                check("seconds_per_rep", p.seconds_per_rep, 1, MINUTE)?;
            }
            Protocol::E2mom(p) => {
                check("total_minutes", p.total_minutes, 2, MAX_MINUTES)?;
                check("reps_per_interval", p.reps_per_interval, 1, MAX_COUNT)?;
                check("seconds_per_rep", p.seconds_per_rep, 1, TWO_MINUTES)?;
            }
            Protocol::DeathBy(p) => {
                check("max_minutes", p.max_minutes, 1, MAX_MINUTES)?;
                check("starting_reps", p.starting_reps, 1, MAX_COUNT)?;
                check("rep_increment", p.rep_increment, 0, MAX_COUNT)?;
                check("seconds_per_rep", p.seconds_per_rep, 1, MINUTE)?;
            }
            Protocol::Amrap(p) => {
                check("total_minutes", p.total_minutes, 1, MAX_MINUTES)?;
            }
        }
        Ok(())
    }

    /// Validates the parameters and computes the closed-form timing split.
    pub fn summary(&self) -> Result<ProtocolSummary, ProtocolError> {
        self.validate()?;

        let (total_seconds, work_seconds, rounds) = match self {
            Protocol::Hiit(p) => {
                let blocks = p.rounds * p.exercise_count;
                (
                    (p.work_seconds + p.rest_seconds) * blocks,
                    p.work_seconds * blocks,
                    p.rounds,
                )
            }
            Protocol::Tabata(p) => {
                let blocks = p.cycles * p.sets;
                (
                    (p.work_seconds + p.rest_seconds) * blocks
                        + p.set_rest_seconds * (p.sets - 1),
                    p.work_seconds * blocks,
                    blocks,
                )
            }
            Protocol::Hict(p) => {
                let blocks = p.exercise_count * p.rounds;
                (
                    (p.work_seconds + p.rest_seconds) * blocks
                        + p.round_rest_seconds * (p.rounds - 1),
                    p.work_seconds * blocks,
                    p.rounds,
                )
            }
            Protocol::Emom(p) => (
                MINUTE * p.total_minutes,
                p.total_minutes * capped_work(p.reps_per_minute, p.seconds_per_rep, MINUTE),
                p.total_minutes,
            ),
            Protocol::E2mom(p) => {
                let intervals = p.total_minutes / 2;
                (
                    TWO_MINUTES * intervals,
                    intervals * capped_work(p.reps_per_interval, p.seconds_per_rep, TWO_MINUTES),
                    intervals,
                )
            }
            Protocol::DeathBy(p) => {
                let work = (1..=p.max_minutes)
                    .map(|minute| {
                        capped_work(death_by_reps(p, minute), p.seconds_per_rep, MINUTE)
                    })
                    .sum();
                (MINUTE * p.max_minutes, work, p.max_minutes)
            }
            Protocol::Amrap(p) => (MINUTE * p.total_minutes, MINUTE * p.total_minutes, 1),
        };

        if total_seconds == 0 {
            return Err(ProtocolError::EmptySession {
                protocol: self.kind(),
            });
        }

        Ok(ProtocolSummary {
            protocol: self.kind(),
            total_seconds,
            work_seconds,
            rest_seconds: total_seconds - work_seconds,
            intensity_percent: intensity_percent(work_seconds, total_seconds),
            rounds,
        })
    }

    /// Ordered work/rest phases. Zero-length phases are omitted.
    pub fn phases(&self) -> Result<Vec<Phase>, ProtocolError> {
        self.validate()?;

        let mut phases = Vec::new();
        match self {
            Protocol::Hiit(p) => {
                for round in 1..=p.rounds {
                    for _ in 0..p.exercise_count {
                        push_work_rest(&mut phases, p.work_seconds, p.rest_seconds, round);
                    }
                }
            }
            Protocol::Tabata(p) => {
                for set in 1..=p.sets {
                    for cycle in 1..=p.cycles {
                        let round = (set - 1) * p.cycles + cycle;
                        push_work_rest(&mut phases, p.work_seconds, p.rest_seconds, round);
                    }
                    if set < p.sets && p.set_rest_seconds > 0 {
                        phases.push(Phase::recovery(p.set_rest_seconds, set * p.cycles));
                    }
                }
            }
            Protocol::Hict(p) => {
                for round in 1..=p.rounds {
                    for _ in 0..p.exercise_count {
                        push_work_rest(&mut phases, p.work_seconds, p.rest_seconds, round);
                    }
                    if round < p.rounds && p.round_rest_seconds > 0 {
                        phases.push(Phase::recovery(p.round_rest_seconds, round));
                    }
                }
            }
            Protocol::Emom(p) => {
                let work = capped_work(p.reps_per_minute, p.seconds_per_rep, MINUTE);
                for minute in 1..=p.total_minutes {
                    push_work_rest(&mut phases, work, MINUTE - work, minute);
                }
            }
            Protocol::E2mom(p) => {
                let work = capped_work(p.reps_per_interval, p.seconds_per_rep, TWO_MINUTES);
                for interval in 1..=p.total_minutes / 2 {
                    push_work_rest(&mut phases, work, TWO_MINUTES - work, interval);
                }
            }
            Protocol::DeathBy(p) => {
                for minute in 1..=p.max_minutes {
                    let work = capped_work(death_by_reps(p, minute), p.seconds_per_rep, MINUTE);
                    push_work_rest(&mut phases, work, MINUTE - work, minute);
                }
            }
            Protocol::Amrap(p) => phases.push(Phase::work(MINUTE * p.total_minutes, 1)),
        }

        Ok(phases)
    }
}

fn death_by_reps(params: &DeathByParams, minute: u32) -> u32 {
    params.starting_reps + (minute - 1) * params.rep_increment
}

fn push_work_rest(phases: &mut Vec<Phase>, work: u32, rest: u32, round: u32) {
    if work > 0 {
        phases.push(Phase::work(work, round));
    }
    if rest > 0 {
        phases.push(Phase::rest(rest, round));
    }
}
