//! Pipe configuration dialog model.
//!
//! The form keeps raw text so the UI can bind text edits directly; nothing
//! reaches the graph until `validate` succeeds.

use wf_core::{format_number, parse_non_negative, parse_number, parse_positive, require_text, NodeHandle, PipeHandle, WfError};
use wf_graph::{Inclination, PipeParameters};
use wf_project::Catalog;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipeForm {
    pub pipe_type: String,
    pub diameter: String,
    pub length: String,
    pub inclination: Inclination,
    pub bend_radius: String,
    pub bend_angle: String,
    pub pipe_ref: String,
    pub supplier: String,
}

impl PipeForm {
    /// Pre-fill from an existing pipe.
    pub fn from_parameters(p: &PipeParameters) -> Self {
        let bent = p.inclination == Inclination::Bent;
        Self {
            pipe_type: p.pipe_type.clone(),
            diameter: format_number(p.diameter_mm),
            length: format_number(p.length_mm),
            inclination: p.inclination,
            bend_radius: if bent { format_number(p.bend_radius_mm) } else { String::new() },
            bend_angle: if bent { format_number(p.bend_angle_deg) } else { String::new() },
            pipe_ref: p.pipe_ref.clone(),
            supplier: p.supplier.clone(),
        }
    }

    /// Fill reference and supplier from the catalog row matching the
    /// selected type and diameter. Returns whether a row matched.
    pub fn prefill_from_catalog(&mut self, catalog: &Catalog) -> bool {
        let Ok(diameter) = parse_number(&self.diameter, "diameter") else {
            return false;
        };
        match catalog.pipe(self.pipe_type.trim(), diameter) {
            Some(row) => {
                self.pipe_ref = row.pipe_ref.clone();
                self.supplier = row.supplier.clone();
                true
            }
            None => false,
        }
    }

    pub fn validate(&self) -> Result<PipeParameters, WfError> {
        let pipe_type = require_text(&self.pipe_type, "pipe type")?.to_string();
        let diameter_mm = parse_positive(&self.diameter, "diameter")?;
        let length_mm = parse_non_negative(&self.length, "length")?;
        let (bend_radius_mm, bend_angle_deg) = match self.inclination {
            Inclination::Straight => (0.0, 0.0),
            Inclination::Bent => (
                parse_positive(&self.bend_radius, "bend radius")?,
                parse_non_negative(&self.bend_angle, "bend angle")?,
            ),
        };
        let params = PipeParameters {
            diameter_mm,
            pipe_type,
            length_mm,
            inclination: self.inclination,
            bend_radius_mm,
            bend_angle_deg,
            pipe_ref: self.pipe_ref.trim().to_string(),
            supplier: self.supplier.trim().to_string(),
        };
        params.validate()?;
        Ok(params)
    }
}

/// What confirming the dialog will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeTarget {
    /// Create a pipe between two nodes, in clicked order.
    New { first: NodeHandle, second: NodeHandle },
    Edit(PipeHandle),
}

/// An open pipe dialog. Closing it without confirming discards the edit.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeDialog {
    pub target: PipeTarget,
    pub form: PipeForm,
    /// Last validation message, shown until the next confirm attempt.
    pub error: Option<String>,
}

impl PipeDialog {
    pub fn new_pipe(first: NodeHandle, second: NodeHandle, catalog: &Catalog) -> Self {
        let mut form = PipeForm::default();
        if let Some(row) = catalog.pipes.first() {
            form.pipe_type = row.pipe_type.clone();
            form.diameter = format_number(row.diameter_mm);
            form.prefill_from_catalog(catalog);
        }
        Self {
            target: PipeTarget::New { first, second },
            form,
            error: None,
        }
    }

    pub fn edit_pipe(pipe: PipeHandle, current: &PipeParameters) -> Self {
        Self {
            target: PipeTarget::Edit(pipe),
            form: PipeForm::from_parameters(current),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PipeForm {
        PipeForm {
            pipe_type: "PA12".into(),
            diameter: "8".into(),
            length: "1500".into(),
            ..Default::default()
        }
    }

    #[test]
    fn straight_pipe_validates() {
        let p = form().validate().unwrap();
        assert_eq!(p.diameter_mm, 8.0);
        assert_eq!(p.length_mm, 1500.0);
        assert_eq!(p.bend_radius_mm, 0.0);
    }

    #[test]
    fn errors_name_the_field() {
        let mut f = form();
        f.diameter = "abc".into();
        match f.validate() {
            Err(WfError::InvalidInput { field, .. }) => assert_eq!(field, "diameter"),
            other => panic!("unexpected {other:?}"),
        }

        let mut f = form();
        f.length = "-1".into();
        assert!(f.validate().is_err());

        let mut f = form();
        f.pipe_type.clear();
        match f.validate() {
            Err(WfError::InvalidInput { field, .. }) => assert_eq!(field, "pipe type"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bent_pipe_requires_radius() {
        let mut f = form();
        f.inclination = Inclination::Bent;
        assert!(f.validate().is_err());
        f.bend_radius = "25".into();
        f.bend_angle = "90".into();
        let p = f.validate().unwrap();
        assert_eq!(p.bend_radius_mm, 25.0);
        assert_eq!(PipeForm::from_parameters(&p).bend_radius, "25");
    }

    #[test]
    fn catalog_prefill_sets_reference() {
        let catalog = Catalog::fallback();
        let row = catalog.pipes[0].clone();
        let mut f = PipeForm {
            pipe_type: row.pipe_type.clone(),
            diameter: format_number(row.diameter_mm),
            ..Default::default()
        };
        assert!(f.prefill_from_catalog(&catalog));
        assert_eq!(f.pipe_ref, row.pipe_ref);

        f.diameter = "9999".into();
        assert!(!f.prefill_from_catalog(&catalog));
    }
}
