//! Line colour scheme.
//!
//! Lines with an official colour get it; everything else falls back to the
//! colour of its transit mode, then to a neutral default.

use serde::Serialize;

use super::line::{LineInfo, TransitMode};

/// Background, text and optional border colours as CSS hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineColors {
    pub background: &'static str,
    pub text: &'static str,
    pub border: &'static str,
}

const fn colors(background: &'static str, text: &'static str, border: &'static str) -> LineColors {
    LineColors {
        background,
        text,
        border,
    }
}

pub const DEFAULT_COLORS: LineColors = colors("#FFFFFF", "#444444", "");

const LINE_COLORS: &[(&str, LineColors)] = &[
    ("S1", colors("#1FBCE6", "#FFFFFF", "")),
    ("S2", colors("#79B833", "#FFFFFF", "")),
    ("S3", colors("#962A85", "#FFFFFF", "")),
    ("S4", colors("#E41F28", "#FFFFFF", "")),
    ("S5", colors("#00527F", "#FFFFFF", "")),
    ("S6", colors("#008F5C", "#FFFFFF", "")),
    ("S7", colors("#8A372F", "#FFFFFF", "")),
    ("S8", colors("#2D2B29", "#FFCD01", "")),
    ("S20", colors("#EA5770", "#FFFFFF", "")),
    ("U1", colors("#438136", "#FFFFFF", "")),
    ("U2", colors("#C40C37", "#FFFFFF", "")),
    ("U3", colors("#F36E31", "#FFFFFF", "")),
    ("U4", colors("#0AB38D", "#FFFFFF", "")),
    ("U5", colors("#B8740E", "#FFFFFF", "")),
    ("U6", colors("#006CB3", "#FFFFFF", "")),
    ("U7", colors("#438136", "#FFFFFF", "")),
    ("U8", colors("#C40C37", "#FFFFFF", "")),
    ("12", colors("#96368B", "#FFFFFF", "")),
    ("16", colors("#0065AE", "#FFFFFF", "")),
    ("17", colors("#8B563E", "#FFFFFF", "")),
    ("18", colors("#13A538", "#FFFFFF", "")),
    ("19", colors("#E30613", "#FFFFFF", "")),
    ("20", colors("#16BAE7", "#FFFFFF", "")),
    ("21", colors("#B28D33", "#FFFFFF", "")),
    ("23", colors("#BCCF00", "#FFFFFF", "")),
    ("25", colors("#F1919C", "#FFFFFF", "")),
    ("27", colors("#F7A600", "#FFFFFF", "")),
    ("28", colors("#FFFFFF", "#F7A600", "#F7A600")),
    ("RE1", colors("#E50000", "#FFFFFF", "#7C7C7C")),
    ("RE5", colors("#004080", "#FFFFFF", "#7C7C7C")),
    ("RB16", colors("#FF9999", "#FFFFFF", "#999999")),
    ("RB54", colors("#00ACE5", "#FFFFFF", "#999999")),
    ("HEX", colors("#646464", "#FFFFFF", "")),
];

/// Colours of a transit mode, used when the line has none of its own.
pub fn mode_colors(mode: &TransitMode) -> LineColors {
    match mode {
        TransitMode::SBahn => colors("#4C9046", "#FFFFFF", ""),
        TransitMode::UBahn => colors("#0066AE", "#FFFFFF", ""),
        TransitMode::Tram => colors("#E30613", "#FFFFFF", ""),
        TransitMode::NachtTram => colors("#1D1D1B", "#FBBA00", ""),
        TransitMode::MetroBus => colors("#EC6726", "#FFFFFF", ""),
        TransitMode::Bus => colors("#005262", "#FFFFFF", ""),
        TransitMode::ExpressBus => colors("#244A9A", "#FFFFFF", ""),
        TransitMode::NachtBus => colors("#1D1D1B", "#FBBA00", ""),
        TransitMode::Regionalzug => colors("#36397f", "#FFFFFF", ""),
        TransitMode::FlexLinie => colors("#005262", "#FFFFFF", ""),
        TransitMode::Sev => colors("#4C9046", "#FFFFFF", ""),
        TransitMode::Unknown(_) => DEFAULT_COLORS,
    }
}

/// Colours for a line.
pub fn line_colors(line: &LineInfo) -> LineColors {
    let number = normalize_line_number(&line.number);
    LINE_COLORS
        .iter()
        .find(|(n, _)| *n == number)
        .map(|(_, c)| *c)
        .unwrap_or_else(|| mode_colors(&line.name))
}

/// Trim and uppercase; combined lines such as `S6/8` use their first number.
fn normalize_line_number(number: &str) -> String {
    let cleaned = number.trim().to_uppercase();
    match cleaned.split_once('/') {
        Some((first, _)) => first.to_string(),
        None => cleaned,
    }
}
