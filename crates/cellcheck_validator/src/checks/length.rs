use super::{
    CellValidator, ConstraintContext, MAXIMUM_LENGTH_CONSTRAINT, MINIMUM_LENGTH_CONSTRAINT,
    ValidatorBase,
};
use crate::InspectionError;
use cellcheck_core::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Limit {
    Min,
    Max,
}

/// Checks the character length of the raw text, whatever the declared type.
///
/// A missing cell fails `minLength` and passes `maxLength`.
#[derive(Debug, Clone)]
pub struct LengthValidator {
    base: ValidatorBase,
    limit: Limit,
    length: usize,
}

impl LengthValidator {
    /// Builds a `minLength` check.
    pub fn min_length(ctx: &ConstraintContext<'_>) -> Result<Self, InspectionError> {
        Ok(Self {
            base: ctx.base(MINIMUM_LENGTH_CONSTRAINT),
            limit: Limit::Min,
            length: ctx.count()?,
        })
    }

    /// Builds a `maxLength` check.
    pub fn max_length(ctx: &ConstraintContext<'_>) -> Result<Self, InspectionError> {
        Ok(Self {
            base: ctx.base(MAXIMUM_LENGTH_CONSTRAINT),
            limit: Limit::Max,
            length: ctx.count()?,
        })
    }
}

impl CellValidator for LengthValidator {
    fn code(&self) -> &'static str {
        match self.limit {
            Limit::Min => MINIMUM_LENGTH_CONSTRAINT,
            Limit::Max => MAXIMUM_LENGTH_CONSTRAINT,
        }
    }

    fn base(&self) -> &ValidatorBase {
        &self.base
    }

    fn check_cell(&self, cell: Option<&Cell>) -> bool {
        let text = match cell {
            Some(cell) if !cell.is_missing() => cell.text(),
            _ => return self.limit == Limit::Max,
        };
        let length = text.chars().count();
        match self.limit {
            Limit::Min => length >= self.length,
            Limit::Max => length <= self.length,
        }
    }

    fn lookup(&self) -> Vec<(&'static str, String)> {
        vec![("constraint", self.length.to_string())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{cell, context, field, target};
    use cellcheck_core::{CellValue, InspectOptions};
    use serde_json::{Value, json};

    fn build(
        constraint: &str,
        payload: Value,
        make: fn(&ConstraintContext<'_>) -> Result<LengthValidator, InspectionError>,
    ) -> Result<LengthValidator, InspectionError> {
        let (target, field, options) = (target(), field("string"), InspectOptions::new());
        make(&context(&target, &field, constraint, &payload, &options))
    }

    #[test]
    fn test_min_length() {
        let validator = build("minLength", json!(3), LengthValidator::min_length).unwrap();
        assert!(!validator.check_cell(Some(&cell("ab"))));
        assert!(validator.check_cell(Some(&cell("abc"))));
        assert!(validator.check_cell(Some(&cell("äöü"))));
        assert!(!validator.check_cell(Some(&cell(""))));
        assert!(!validator.check_cell(None));
    }

    #[test]
    fn test_max_length() {
        let validator = build("maxLength", json!("2"), LengthValidator::max_length).unwrap();
        assert!(validator.check_cell(Some(&cell("ab"))));
        assert!(!validator.check_cell(Some(&cell("abc"))));
        assert!(validator.check_cell(Some(&cell(""))));
        assert!(validator.check_cell(None));
        // Length is measured on the text of typed cells too.
        assert!(!validator.check_cell(Some(&cell(CellValue::Int(1965)))));
    }

    #[test]
    fn test_invalid_length_payload() {
        assert!(build("minLength", json!(-1), LengthValidator::min_length).is_err());
        assert!(build("maxLength", json!("ten"), LengthValidator::max_length).is_err());
        assert!(build("maxLength", json!(2.5), LengthValidator::max_length).is_err());
    }
}
