//! Timeline layout: pumps run in parallel, outputs of one pump run serially.

use std::collections::BTreeMap;

use wf_core::format_number;

use crate::row::{Priority, SequenceRow};

/// Upper bound on the number of tick intervals on one axis.
pub const MAX_TICKS: usize = 500;

/// Drawable interval for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSpan {
    /// Index into the row slice given to `layout`.
    pub row: usize,
    pub pump_index: usize,
    pub output_index: u32,
    pub label: String,
    pub priority: Priority,
    pub start_s: f64,
    pub end_s: f64,
}

impl TimelineSpan {
    pub fn duration_s(&self) -> f64 {
        self.end_s - self.start_s
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timeline {
    pub spans: Vec<TimelineSpan>,
    /// End of each pump's last output.
    pub pump_totals: BTreeMap<usize, f64>,
    pub total_duration_s: f64,
}

impl Timeline {
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Tick positions from zero to the total at the chosen interval, at most
    /// `MAX_TICKS + 1` of them. A non-finite total yields only the origin.
    pub fn ticks(&self) -> Vec<f64> {
        if !self.total_duration_s.is_finite() {
            return vec![0.0];
        }
        let step = tick_interval(self.total_duration_s);
        let wanted = (self.total_duration_s / step).ceil();
        let count = if wanted > MAX_TICKS as f64 {
            MAX_TICKS
        } else {
            wanted as usize
        };
        let step = if count == 0 {
            step
        } else {
            step.max(self.total_duration_s / count as f64)
        };
        (0..=count).map(|i| i as f64 * step).collect()
    }
}

/// Lay out rows. Rows without a positive duration are left out.
///
/// Per pump, outputs are ranked primary first then by index; every row of an
/// output starts with the output, which lasts as long as its longest row.
pub fn layout(rows: &[SequenceRow]) -> Timeline {
    let mut by_pump: BTreeMap<usize, BTreeMap<u32, Vec<(usize, f64)>>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        let Some(d) = row.duration_seconds() else {
            continue;
        };
        by_pump
            .entry(row.pump_index)
            .or_default()
            .entry(row.output_index)
            .or_default()
            .push((i, d));
    }

    let mut timeline = Timeline::default();
    for (pump, outputs) in by_pump {
        let mut ranked: Vec<(u32, &Vec<(usize, f64)>)> = outputs.iter().map(|(o, r)| (*o, r)).collect();
        ranked.sort_by_key(|(o, members)| {
            let priority = members
                .first()
                .map(|(i, _)| rows[*i].priority)
                .unwrap_or_default();
            (priority, *o)
        });

        let mut start = 0.0;
        for (output, members) in ranked {
            let mut longest: f64 = 0.0;
            for &(i, d) in members {
                let row = &rows[i];
                timeline.spans.push(TimelineSpan {
                    row: i,
                    pump_index: pump,
                    output_index: output,
                    label: row.display_name.clone(),
                    priority: row.priority,
                    start_s: start,
                    end_s: start + d,
                });
                longest = longest.max(d);
            }
            start += longest;
        }
        timeline.pump_totals.insert(pump, start);
        timeline.total_duration_s = timeline.total_duration_s.max(start);
    }
    timeline
}

/// Axis tick interval in seconds for a timeline of `total_s` seconds.
pub fn tick_interval(total_s: f64) -> f64 {
    match total_s {
        t if t <= 0.01 => 0.001,
        t if t <= 0.1 => 0.01,
        t if t <= 2.0 => 0.2,
        t if t <= 10.0 => 1.0,
        t if t <= 60.0 => 5.0,
        t if t <= 300.0 => 30.0,
        _ => 60.0,
    }
}

/// Tick label: milliseconds below one-second intervals, seconds otherwise.
pub fn format_tick(t_s: f64, interval_s: f64) -> String {
    if interval_s < 1.0 {
        format!("{} ms", format_number((t_s * 1000.0).round()))
    } else {
        format!("{} s", format_number(t_s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::DurationUnit;

    fn row(pump: usize, output: u32, name: &str, d: &str, p: Priority) -> SequenceRow {
        let mut r = SequenceRow::new(pump, output, name, name);
        r.duration = d.into();
        r.priority = p;
        r
    }

    #[test]
    fn pumps_run_in_parallel() {
        let rows = vec![
            row(0, 1, "A", "5", Priority::Primary),
            row(1, 1, "B", "3", Priority::Secondary),
        ];
        let t = layout(&rows);
        assert_eq!((t.spans[0].start_s, t.spans[0].end_s), (0.0, 5.0));
        assert_eq!((t.spans[1].start_s, t.spans[1].end_s), (0.0, 3.0));
        assert_eq!(t.total_duration_s, 5.0);
    }

    #[test]
    fn primary_output_runs_first() {
        let rows = vec![
            row(0, 1, "A", "2", Priority::Secondary),
            row(0, 1, "A2", "4", Priority::Secondary),
            row(0, 2, "B", "3", Priority::Primary),
        ];
        let t = layout(&rows);
        let b = t.spans.iter().find(|s| s.label == "B").unwrap();
        assert_eq!((b.start_s, b.end_s), (0.0, 3.0));
        let a2 = t.spans.iter().find(|s| s.label == "A2").unwrap();
        assert_eq!((a2.start_s, a2.end_s), (3.0, 7.0));
        let a = t.spans.iter().find(|s| s.label == "A").unwrap();
        assert_eq!(a.start_s, 3.0);
        assert_eq!(t.pump_totals[&0], 7.0);
    }

    #[test]
    fn ties_break_by_output_index() {
        let rows = vec![
            row(0, 2, "B", "1", Priority::Secondary),
            row(0, 1, "A", "1", Priority::Secondary),
        ];
        let t = layout(&rows);
        let a = t.spans.iter().find(|s| s.label == "A").unwrap();
        assert_eq!(a.start_s, 0.0);
    }

    #[test]
    fn rows_without_duration_are_skipped() {
        let mut ms_row = row(0, 1, "A", "500", Priority::Primary);
        ms_row.unit = DurationUnit::Millis;
        let rows = vec![ms_row, row(0, 1, "B", "", Priority::Primary)];
        let t = layout(&rows);
        assert_eq!(t.spans.len(), 1);
        assert!((t.total_duration_s - 0.5).abs() < 1e-12);
    }

    #[test]
    fn tick_bands() {
        assert_eq!(tick_interval(0.005), 0.001);
        assert_eq!(tick_interval(0.05), 0.01);
        assert_eq!(tick_interval(1.5), 0.2);
        assert_eq!(tick_interval(8.0), 1.0);
        assert_eq!(tick_interval(45.0), 5.0);
        assert_eq!(tick_interval(200.0), 30.0);
        assert_eq!(tick_interval(1200.0), 60.0);
    }

    #[test]
    fn tick_labels() {
        assert_eq!(format_tick(0.4, 0.2), "400 ms");
        assert_eq!(format_tick(10.0, 5.0), "10 s");
    }

    #[test]
    fn ticks_cover_total() {
        let t = layout(&[row(0, 1, "A", "7", Priority::Primary)]);
        let ticks = t.ticks();
        assert_eq!(ticks.first(), Some(&0.0));
        assert_eq!(ticks.last(), Some(&7.0));
    }

    #[test]
    fn ticks_stay_bounded_for_huge_totals() {
        let rows = vec![
            row(0, 1, "A", "1e308", Priority::Primary),
            row(0, 2, "B", "1e308", Priority::Secondary),
        ];
        let t = layout(&rows);
        assert!(t.ticks().len() <= MAX_TICKS + 1);

        let wide = layout(&[row(0, 1, "A", "1e9", Priority::Primary)]);
        let ticks = wide.ticks();
        assert_eq!(ticks.len(), MAX_TICKS + 1);
        assert_eq!(ticks.last(), Some(&1e9));
    }
}
