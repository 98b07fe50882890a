//! The sequence table: rows derived from circuit interpretations.

use std::collections::BTreeMap;

use tracing::debug;
use wf_core::WfError;
use wf_graph::PumpInterpretation;

use crate::error::{SequenceError, SequenceResult};
use crate::row::{DurationUnit, Priority, SequenceRow};

/// A breach of the intra-pump priority rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityConflict {
    /// Rows of one output carry different priorities.
    MixedWithinOutput { pump_index: usize, output_index: u32 },
    /// Two populated outputs of one pump share a priority.
    SharedAcrossOutputs {
        pump_index: usize,
        outputs: (u32, u32),
        priority: Priority,
    },
}

impl std::fmt::Display for PriorityConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriorityConflict::MixedWithinOutput {
                pump_index,
                output_index,
            } => write!(
                f,
                "Pump {} output {} mixes priorities",
                pump_index + 1,
                output_index
            ),
            PriorityConflict::SharedAcrossOutputs {
                pump_index,
                outputs,
                priority,
            } => write!(
                f,
                "Pump {} outputs {} and {} are both {}",
                pump_index + 1,
                outputs.0,
                outputs.1,
                priority
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SequenceTable {
    rows: Vec<SequenceRow>,
    propagating: bool,
}

impl SequenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<SequenceRow>) -> Self {
        Self {
            rows,
            propagating: false,
        }
    }

    pub fn rows(&self) -> &[SequenceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Regenerate rows from interpretations, in pump, output, traversal order.
    ///
    /// Entered values carry over from a previous row with the same component
    /// id, falling back to the same display name. Each output then takes the
    /// priority of its first carried row so rows of one output agree.
    pub fn rebuild(&mut self, interpretations: &[PumpInterpretation]) {
        let previous = std::mem::take(&mut self.rows);
        let mut used = vec![false; previous.len()];

        let mut ordered: Vec<&PumpInterpretation> = interpretations.iter().collect();
        ordered.sort_by_key(|i| i.pump_index);

        let mut carried_any = 0;
        for interp in ordered {
            for (&output, reached) in &interp.outputs {
                let mut output_priority: Option<Priority> = None;
                let first_row = self.rows.len();
                for component in reached {
                    let mut row =
                        SequenceRow::new(interp.pump_index, output, &component.id, &component.name);
                    let found = find_unused(&previous, &used, |p| p.component_id == component.id)
                        .or_else(|| {
                            find_unused(&previous, &used, |p| p.display_name == component.name)
                        });
                    if let Some(i) = found {
                        used[i] = true;
                        row.carry_from(&previous[i]);
                        output_priority.get_or_insert(row.priority);
                        carried_any += 1;
                    }
                    self.rows.push(row);
                }
                if let Some(p) = output_priority {
                    for row in &mut self.rows[first_row..] {
                        row.priority = p;
                    }
                }
            }
        }
        debug!(
            rows = self.rows.len(),
            carried = carried_any,
            "sequence rows rebuilt"
        );
    }

    fn row_mut(&mut self, row: usize) -> SequenceResult<&mut SequenceRow> {
        let len = self.rows.len();
        self.rows
            .get_mut(row)
            .ok_or(SequenceError::RowOutOfRange { row, len })
    }

    /// Set `row` to `priority`: its output follows, the pump's other outputs
    /// take the opposite, other pumps are untouched.
    ///
    /// Returns how many rows changed. Calls made while a propagation is
    /// running are ignored.
    pub fn set_priority(&mut self, row: usize, priority: Priority) -> SequenceResult<usize> {
        if self.propagating {
            return Ok(0);
        }
        let (pump, output) = {
            let r = self.row_mut(row)?;
            (r.pump_index, r.output_index)
        };
        self.propagating = true;
        let mut changed = 0;
        for r in self.rows.iter_mut().filter(|r| r.pump_index == pump) {
            let want = if r.output_index == output {
                priority
            } else {
                priority.opposite()
            };
            if r.priority != want {
                r.priority = want;
                changed += 1;
            }
        }
        self.propagating = false;
        debug!(pump_index = pump, output, %priority, changed, "priority propagated");
        Ok(changed)
    }

    pub fn set_duration(&mut self, row: usize, text: impl Into<String>) -> SequenceResult<()> {
        self.row_mut(row)?.duration = text.into();
        Ok(())
    }

    /// Like `set_duration` but rejects anything that is not a positive number.
    pub fn enter_duration(&mut self, row: usize, text: &str) -> SequenceResult<f64> {
        let r = self.row_mut(row)?;
        let previous = std::mem::replace(&mut r.duration, text.to_string());
        match r.duration_value() {
            Ok(v) => Ok(v),
            Err(err) => {
                r.duration = previous;
                let reason = match err {
                    WfError::InvalidInput { reason, .. } => reason,
                    other => other.to_string(),
                };
                Err(SequenceError::InvalidDuration {
                    name: r.display_name.clone(),
                    reason,
                })
            }
        }
    }

    pub fn set_unit(&mut self, row: usize, unit: DurationUnit) -> SequenceResult<()> {
        self.row_mut(row)?.unit = unit;
        Ok(())
    }

    pub fn remove_row(&mut self, row: usize) -> SequenceResult<SequenceRow> {
        if row >= self.rows.len() {
            return Err(SequenceError::RowOutOfRange {
                row,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(row))
    }

    /// Rows exist and every row has a positive duration.
    pub fn is_complete(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|r| r.duration_seconds().is_some())
    }

    /// Breaches of the priority rule. Outputs count as populated once any
    /// of their rows has an entered duration.
    pub fn priority_conflicts(&self) -> Vec<PriorityConflict> {
        let mut per_output: BTreeMap<(usize, u32), (Priority, bool, bool)> = BTreeMap::new();
        for r in &self.rows {
            let entry = per_output
                .entry((r.pump_index, r.output_index))
                .or_insert((r.priority, false, false));
            if entry.0 != r.priority {
                entry.1 = true;
            }
            entry.2 |= r.has_entry();
        }

        let mut conflicts = Vec::new();
        for (&(pump_index, output_index), &(_, mixed, _)) in &per_output {
            if mixed {
                conflicts.push(PriorityConflict::MixedWithinOutput {
                    pump_index,
                    output_index,
                });
            }
        }
        let populated: Vec<(usize, u32, Priority)> = per_output
            .iter()
            .filter(|(_, (_, mixed, entered))| *entered && !*mixed)
            .map(|(&(p, o), &(priority, ..))| (p, o, priority))
            .collect();
        for (i, a) in populated.iter().enumerate() {
            for b in &populated[i + 1..] {
                if a.0 == b.0 && a.2 == b.2 {
                    conflicts.push(PriorityConflict::SharedAcrossOutputs {
                        pump_index: a.0,
                        outputs: (a.1, b.1),
                        priority: a.2,
                    });
                }
            }
        }
        conflicts
    }
}

fn find_unused<F>(rows: &[SequenceRow], used: &[bool], pred: F) -> Option<usize>
where
    F: Fn(&SequenceRow) -> bool,
{
    rows.iter()
        .enumerate()
        .find(|(i, r)| !used[*i] && pred(r))
        .map(|(i, _)| i)
}
