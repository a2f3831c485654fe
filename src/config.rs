//! Engine configuration.
//!
//! Institutional tables that drive the engine (study priorities, the
//! preference alphabet of the external scheduler, subgroup chunk sizes).
//! Loaded with `figment`: built-in defaults, then an optional TOML file,
//! then `UTT_`-prefixed environment variables (nested keys split on `__`,
//! e.g. `UTT_STUDY_PRIORITIES__BUN-RI=3`). Map keys such as study names keep
//! their case; field names are matched case-insensitively.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::Uncased;
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::models::{EnrollmentType, PreferenceLevel};

/// Rank given to studies missing from the priority table.
pub const UNRANKED_STUDY: u32 = 100;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub study_priorities: StudyPriorities,
    pub level_symbols: LevelSymbols,
    pub default_enrollment_types: Vec<EnrollmentType>,
    pub subgroups: SubgroupConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            study_priorities: StudyPriorities::default(),
            level_symbols: LevelSymbols::default(),
            default_enrollment_types: vec![EnrollmentType::FIRST_TIME, EnrollmentType::PARALLEL],
            subgroups: SubgroupConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads defaults, overlaid by `path` (TOML) if given and by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        let config: Self = figment
            .merge(
                Env::prefixed("UTT_")
                    .lowercase(false)
                    .map(|key| Uncased::from(env_key(key.as_str()))),
            )
            .extract()?;
        tracing::debug!(
            studies = config.study_priorities.ranks.len(),
            "engine configuration loaded"
        );
        Ok(config)
    }

    /// Parses a TOML document over the defaults, ignoring the environment.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Ok(Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml))
            .extract()?)
    }
}

/// Maps an environment key (prefix stripped) to a figment key path.
///
/// Segments are split on `__` and lowercased, except map keys
/// (`study_priorities.<study>`, `subgroups.chunks.<type>`), which keep
/// their case.
fn env_key(key: &str) -> String {
    let mut segments: Vec<String> = key.split("__").map(str::to_string).collect();
    let keyed = match segments.first().map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("study_priorities") => Some(1),
        Some("subgroups")
            if segments
                .get(1)
                .is_some_and(|s| s.eq_ignore_ascii_case("chunks")) =>
        {
            Some(2)
        }
        _ => None,
    };
    for (i, segment) in segments.iter_mut().enumerate() {
        if Some(i) != keyed {
            *segment = segment.to_ascii_lowercase();
        }
    }
    segments.join(".")
}

/// Study programme ranks; lower ranks are filled first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudyPriorities {
    pub ranks: BTreeMap<String, u32>,
}

impl StudyPriorities {
    /// Empty table: every study is unranked.
    pub fn empty() -> Self {
        Self {
            ranks: BTreeMap::new(),
        }
    }

    /// Sets the rank of a study.
    pub fn with_rank(mut self, study: impl Into<String>, rank: u32) -> Self {
        self.ranks.insert(study.into(), rank);
        self
    }

    /// Rank of a study, [`UNRANKED_STUDY`] if absent.
    pub fn rank(&self, study: &str) -> u32 {
        self.ranks.get(study).copied().unwrap_or(UNRANKED_STUDY)
    }
}

impl Default for StudyPriorities {
    fn default() -> Self {
        let ranks = [
            ("BUN-RI", 1),
            ("BVS-RI", 2),
            ("BMA-RI", 3),
            ("BDR-RI", 4),
            ("BUN-RM", 5),
            ("BUN-MM", 6),
            ("BUN-UI", 7),
            ("BMA-RM", 8),
            ("BMA-MM", 9),
            ("BMA-PRI", 10),
            ("BMA-KO", 11),
        ];
        Self {
            ranks: ranks.iter().map(|&(s, r)| (s.to_string(), r)).collect(),
        }
    }
}

/// Strong and weak symbol of one preference level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolPair {
    pub strong: char,
    pub weak: char,
}

impl SymbolPair {
    pub const fn new(strong: char, weak: char) -> Self {
        Self { strong, weak }
    }
}

/// Preference alphabet of the external scheduler.
///
/// Defaults follow the external system's codes: `R` required, `0`
/// strongly preferred, `1` preferred, `2` neutral, `3` discouraged,
/// `4` strongly discouraged, `P` prohibited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSymbols {
    pub hate: SymbolPair,
    pub cant: SymbolPair,
    pub dislike: SymbolPair,
    pub neutral: SymbolPair,
    pub like: SymbolPair,
    pub love: SymbolPair,
}

impl Default for LevelSymbols {
    fn default() -> Self {
        Self {
            hate: SymbolPair::new('P', '4'),
            cant: SymbolPair::new('P', 'P'),
            dislike: SymbolPair::new('4', '3'),
            neutral: SymbolPair::new('2', '2'),
            like: SymbolPair::new('0', '1'),
            love: SymbolPair::new('R', '0'),
        }
    }
}

impl LevelSymbols {
    /// Symbol pair of a level.
    pub fn pair(&self, level: PreferenceLevel) -> SymbolPair {
        match level {
            PreferenceLevel::Hate => self.hate,
            PreferenceLevel::Cannot => self.cant,
            PreferenceLevel::Dislike => self.dislike,
            PreferenceLevel::Neutral => self.neutral,
            PreferenceLevel::Like => self.like,
            PreferenceLevel::Love => self.love,
        }
    }

    /// Symbol for a level in its strong or weak variant.
    pub fn symbol(&self, level: PreferenceLevel, strong: bool) -> char {
        let pair = self.pair(level);
        if strong {
            pair.strong
        } else {
            pair.weak
        }
    }

    /// Fill symbol for slots without a preference.
    pub fn neutral(&self) -> char {
        self.neutral.weak
    }
}

/// Chunk sizes used when splitting top-level groups into subgroups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubgroupConfig {
    /// Activity type -> preferred chunk sizes, largest first.
    pub chunks: BTreeMap<String, Vec<u32>>,
    /// Short-name marker selecting `marker_chunks` instead.
    pub marker: String,
    pub marker_chunks: Vec<u32>,
}

impl Default for SubgroupConfig {
    fn default() -> Self {
        let mut chunks = BTreeMap::new();
        chunks.insert("LV".to_string(), vec![15, 3, 2, 1]);
        chunks.insert("AV".to_string(), vec![30, 5, 3, 2, 1]);
        Self {
            chunks,
            marker: "PAD".to_string(),
            marker_chunks: vec![3, 2, 1],
        }
    }
}

impl SubgroupConfig {
    /// Chunk sizes for a group of the given short name on an activity type.
    pub fn chunks_for(&self, short_name: &str, activity_type: &str) -> &[u32] {
        if !self.marker.is_empty() && short_name.contains(&self.marker) {
            return &self.marker_chunks;
        }
        self.chunks
            .get(activity_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
