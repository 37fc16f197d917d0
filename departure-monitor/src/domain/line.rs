//! Lines served at a stop and their transit mode.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::line_id::LineId;

/// Transit mode of a line, as named by the provider.
///
/// Unrecognised names are kept verbatim in [`TransitMode::Unknown`] so that
/// they survive a save/load cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransitMode {
    SBahn,
    UBahn,
    Tram,
    NachtTram,
    MetroBus,
    Bus,
    ExpressBus,
    NachtBus,
    FlexLinie,
    Sev,
    Regionalzug,
    Unknown(String),
}

impl TransitMode {
    /// Returns the provider's name for this mode.
    pub fn as_str(&self) -> &str {
        match self {
            TransitMode::SBahn => "S-Bahn",
            TransitMode::UBahn => "U-Bahn",
            TransitMode::Tram => "Tram",
            TransitMode::NachtTram => "NachtTram",
            TransitMode::MetroBus => "MetroBus",
            TransitMode::Bus => "Bus",
            TransitMode::ExpressBus => "ExpressBus",
            TransitMode::NachtBus => "NachtBus",
            TransitMode::FlexLinie => "FLEXlinie",
            TransitMode::Sev => "SEV",
            TransitMode::Regionalzug => "Regionalzug",
            TransitMode::Unknown(name) => name,
        }
    }
}

impl From<String> for TransitMode {
    fn from(name: String) -> Self {
        match name.as_str() {
            "S-Bahn" => TransitMode::SBahn,
            "U-Bahn" => TransitMode::UBahn,
            "Tram" => TransitMode::Tram,
            // Both spellings show up in responses.
            "NachtTram" | "NightTram" => TransitMode::NachtTram,
            "MetroBus" => TransitMode::MetroBus,
            "Bus" => TransitMode::Bus,
            "ExpressBus" => TransitMode::ExpressBus,
            "NachtBus" => TransitMode::NachtBus,
            "FLEXlinie" => TransitMode::FlexLinie,
            "SEV" => TransitMode::Sev,
            "Regionalzug" => TransitMode::Regionalzug,
            _ => TransitMode::Unknown(name),
        }
    }
}

impl From<TransitMode> for String {
    fn from(mode: TransitMode) -> Self {
        match mode {
            TransitMode::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TransitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line serving a stop in one direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInfo {
    /// Public line number, e.g. "S8" or "U2" or "187".
    pub number: String,
    #[serde(default)]
    pub symbol: String,
    /// Destination shown for this direction.
    pub direction: String,
    /// Provider identifier; see [`LineId`].
    pub stateless: LineId,
    /// Transit mode.
    pub name: TransitMode,
}

/// Group lines by transit mode, modes in first-seen order.
pub fn group_lines_by_mode(lines: &[LineInfo]) -> Vec<(TransitMode, Vec<LineInfo>)> {
    let mut groups: Vec<(TransitMode, Vec<LineInfo>)> = Vec::new();
    for line in lines {
        match groups.iter_mut().find(|(mode, _)| *mode == line.name) {
            Some((_, members)) => members.push(line.clone()),
            None => groups.push((line.name.clone(), vec![line.clone()])),
        }
    }
    groups
}

/// Keep only lines whose mode is one of `modes`.
pub fn lines_by_mode<'a>(lines: &'a [LineInfo], modes: &[TransitMode]) -> Vec<&'a LineInfo> {
    lines.iter().filter(|l| modes.contains(&l.name)).collect()
}
