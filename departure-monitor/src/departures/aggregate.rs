//! Turning a flat departure list into a per-line board.

use serde::Serialize;
use tracing::debug;

use crate::domain::{ClockTime, Departure, LineId, LineInfo};

/// Departures of one line, in response order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineGroup {
    /// The line as given by its first departure.
    pub line: LineInfo,
    pub departures: Vec<Departure>,
}

impl LineGroup {
    pub fn id(&self) -> &LineId {
        &self.line.stateless
    }
}

/// Group departures by exact line identifier.
///
/// Groups appear in the order their line is first seen; departures keep
/// their order within a group.
pub fn group_by_line(departures: Vec<Departure>) -> Vec<LineGroup> {
    let mut groups: Vec<LineGroup> = Vec::new();
    for departure in departures {
        match groups
            .iter_mut()
            .find(|g| g.line.stateless == departure.line.stateless)
        {
            Some(group) => group.departures.push(departure),
            None => groups.push(LineGroup {
                line: departure.line.clone(),
                departures: vec![departure],
            }),
        }
    }
    groups
}

/// Minutes by which `live` is later than `planned`; negative when early.
///
/// Zero when there is no live time or it equals the planned one. Times are
/// compared within one day, so a departure planned for 23:55 leaving at
/// 00:10 comes out as -1425. Unparsable times count as on time.
///
/// ```
/// use departure_monitor::departures::compute_delay;
///
/// assert_eq!(compute_delay("08:00", "08:05"), 5);
/// assert_eq!(compute_delay("08:00", ""), 0);
/// assert_eq!(compute_delay("23:55", "00:10"), -1425);
/// ```
pub fn compute_delay(planned: &str, live: &str) -> i32 {
    if live.is_empty() || live == planned {
        return 0;
    }
    match (ClockTime::parse_hhmm(planned), ClockTime::parse_hhmm(live)) {
        (Ok(planned), Ok(live)) => live.minutes_of_day() - planned.minutes_of_day(),
        (Err(e), _) | (_, Err(e)) => {
            debug!(planned, live, error = %e, "unparsable departure time");
            0
        }
    }
}

/// Delay of a single departure.
pub fn delay_of(departure: &Departure) -> i32 {
    compute_delay(&departure.departure_planned, &departure.departure_live)
}

/// Departures the provider flags as not on time.
pub fn delayed_only(departures: &[Departure]) -> Vec<&Departure> {
    departures.iter().filter(|d| !d.in_time).collect()
}

/// The first `n` departures.
pub fn next_n<T>(departures: &[T], n: usize) -> &[T] {
    &departures[..n.min(departures.len())]
}

/// Each departure with its delay in minutes.
pub fn with_delays(departures: &[Departure]) -> Vec<(&Departure, i32)> {
    departures.iter().map(|d| (d, delay_of(d))).collect()
}

#[cfg(test)]
pub(crate) fn departure_fixture(line_id: &str, planned: &str, live: &str) -> Departure {
    use crate::domain::{DepartureStation, TransitMode};

    Departure {
        line: LineInfo {
            number: "U6".into(),
            symbol: "U6".into(),
            direction: "Klinikum Großhadern".into(),
            stateless: LineId::new(line_id),
            name: TransitMode::UBahn,
        },
        direction: "Klinikum Großhadern".into(),
        station: DepartureStation {
            id: "de:09162:2".into(),
            name: "Marienplatz".into(),
        },
        track: "1".into(),
        departure_date: "20241015".into(),
        departure_planned: planned.into(),
        departure_live: live.into(),
        in_time: live.is_empty() || live == planned,
        notifications: Vec::new(),
    }
}
