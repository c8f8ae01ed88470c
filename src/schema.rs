use std::fmt::Display;

use getset::{CopyGetters, Getters};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{EnumIter, EnumString};
use typed_builder::TypedBuilder;

#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    derive_more::From,
    derive_more::Into,
    derive_more::FromStr,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
pub struct UserId(u64);

#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
pub struct ScoreId(u64);

#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
pub struct BeatmapId(u64);

#[derive(
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Debug,
    clap::ValueEnum,
    strum::Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Osu,
    Mania,
    Taiko,
    Fruits,
}

/// Grade assigned to a play by the server.
///
/// Labels the server may add in the future are kept verbatim in [`Rank::Other`].
#[derive(Clone, PartialEq, Eq, Hash, Debug, EnumString, SerializeDisplay, DeserializeFromStr)]
pub enum Rank {
    #[strum(serialize = "XH")]
    SilverSs,
    #[strum(serialize = "X")]
    Ss,
    #[strum(serialize = "SH")]
    SilverS,
    #[strum(serialize = "S")]
    S,
    #[strum(serialize = "A")]
    A,
    #[strum(serialize = "B")]
    B,
    #[strum(serialize = "C")]
    C,
    #[strum(serialize = "D")]
    D,
    #[strum(default)]
    Other(String),
}

impl Rank {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SilverSs => "XH",
            Self::Ss => "X",
            Self::SilverS => "SH",
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::Other(label) => label,
        }
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub statistics: UserStatistics,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserStatistics {
    /// Overall hit accuracy in percent (e.g. `98.5`).
    pub hit_accuracy: f64,
    pub global_rank: Option<u64>,
    pub pp: f64,
    pub play_count: u64,
}

#[derive(Clone, Debug, TypedBuilder, Getters, CopyGetters, Serialize, Deserialize)]
pub struct Score {
    #[getset(get_copy = "pub")]
    id: ScoreId,
    /// Fraction in `[0, 1]`.
    #[getset(get_copy = "pub")]
    accuracy: f64,
    #[getset(get_copy = "pub")]
    max_combo: u32,
    #[getset(get = "pub")]
    #[builder(default)]
    mods: Vec<String>,
    #[getset(get = "pub")]
    rank: Rank,
    #[getset(get_copy = "pub")]
    statistics: ScoreStatistics,
    #[getset(get = "pub")]
    beatmap: BeatmapRef,
    #[getset(get = "pub")]
    beatmapset: BeatmapsetRef,
}

impl Score {
    /// `+HDDT` style, or a bare `+` for a nomod play.
    pub fn mods_string(&self) -> String {
        format!("+{}", self.mods.iter().join(""))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, TypedBuilder, Serialize, Deserialize)]
pub struct ScoreStatistics {
    pub count_50: u32,
    pub count_100: u32,
    pub count_300: u32,
    pub count_miss: u32,
}

/// The beatmap summary embedded in a score.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BeatmapRef {
    pub id: BeatmapId,
    /// Difficulty name.
    pub version: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BeatmapsetRef {
    pub title: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Beatmap {
    pub id: BeatmapId,
    pub max_combo: u32,
}
