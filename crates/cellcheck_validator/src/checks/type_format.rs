use super::{CellValidator, ColumnTarget, TYPE_OR_FORMAT_ERROR, ValidatorBase};
use crate::ValueCoercer;
use cellcheck_core::{Cell, Field, InspectOptions};

/// Fails a cell whose value cannot be read as the field's type and format.
///
/// Always the first validator of a column plan.
#[derive(Debug, Clone)]
pub struct TypeOrFormatValidator {
    base: ValidatorBase,
    coercer: ValueCoercer,
}

impl TypeOrFormatValidator {
    /// Creates the check for a field's declared type and format.
    pub fn new(target: &ColumnTarget, field: &Field, options: &InspectOptions) -> Self {
        Self {
            base: ValidatorBase::new(TYPE_OR_FORMAT_ERROR, target, options),
            coercer: ValueCoercer::for_field(field, options.strict),
        }
    }
}

impl CellValidator for TypeOrFormatValidator {
    fn code(&self) -> &'static str {
        TYPE_OR_FORMAT_ERROR
    }

    fn base(&self) -> &ValidatorBase {
        &self.base
    }

    fn check_cell(&self, cell: Option<&Cell>) -> bool {
        self.coercer.coerce_cell(cell).is_ok()
    }

    fn lookup(&self) -> Vec<(&'static str, String)> {
        vec![
            ("field_type", self.coercer.field_type().to_string()),
            ("field_format", self.coercer.format().to_string()),
        ]
    }
}
