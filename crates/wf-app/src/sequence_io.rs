//! Conversions between sequence rows and the `sequences` document section.

use tracing::warn;
use wf_core::format_number;
use wf_project::{PriorityDef, SequenceConfigurationDef, SequencesSection, TaskDef, UnitDef};
use wf_sequence::{layout, DurationUnit, Priority, SequenceRow};

pub fn task_from_row(row: &SequenceRow) -> TaskDef {
    let duration = row.duration_value().unwrap_or(0.0);
    TaskDef {
        name: row.display_name.clone(),
        duration,
        unit: match row.unit {
            DurationUnit::Seconds => UnitDef::Seconds,
            DurationUnit::Millis => UnitDef::Millis,
        },
        priority: match row.priority {
            Priority::Primary => PriorityDef::Primary,
            Priority::Secondary => PriorityDef::Secondary,
        },
        duration_seconds: row.duration_seconds().unwrap_or(0.0),
        pump_index: row.pump_index,
        output_num: row.output_index.to_string(),
        component_id: row.component_id.clone(),
    }
}

/// `None` when the output number is not a positive integer.
pub fn row_from_task(task: &TaskDef) -> Option<SequenceRow> {
    let output_index = match task.output_num.trim().parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => {
            warn!(task = %task.name, output = %task.output_num, "skipping task with bad output number");
            return None;
        }
    };
    let mut row = SequenceRow::new(task.pump_index, output_index, &task.component_id, &task.name);
    if task.duration > 0.0 {
        row.duration = format_number(task.duration);
    }
    row.unit = match task.unit {
        UnitDef::Seconds => DurationUnit::Seconds,
        UnitDef::Millis => DurationUnit::Millis,
    };
    row.priority = match task.priority {
        PriorityDef::Primary => Priority::Primary,
        PriorityDef::Secondary => Priority::Secondary,
    };
    Some(row)
}

pub fn rows_from_section(section: &SequencesSection) -> Vec<SequenceRow> {
    section
        .sequence_configuration
        .tasks
        .iter()
        .filter_map(row_from_task)
        .collect()
}

/// Section for `rows`, totals taken from the timeline layout.
pub fn section_from_rows(rows: &[SequenceRow], previous: &SequencesSection) -> SequencesSection {
    let timeline = layout(rows);
    SequencesSection {
        sequence_configuration: SequenceConfigurationDef {
            tasks: rows.iter().map(task_from_row).collect(),
            total_duration_seconds: timeline.total_duration_s,
            total_tasks: rows.len(),
        },
        extra: previous.extra.clone(),
    }
}
