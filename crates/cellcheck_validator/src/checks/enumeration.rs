use super::{CellValidator, ConstraintContext, ENUMERABLE_CONSTRAINT, ValidatorBase};
use crate::{InspectionError, TypedValue, ValueCoercer};
use cellcheck_core::Cell;
use serde_json::Value;
use std::cmp::Ordering;

/// Requires the coerced value to equal one of the declared members.
#[derive(Debug, Clone)]
pub struct EnumValidator {
    base: ValidatorBase,
    coercer: ValueCoercer,
    members: Vec<TypedValue>,
    members_text: String,
}

impl EnumValidator {
    /// Coerces every member of the payload array with the field's type.
    pub fn new(ctx: &ConstraintContext<'_>) -> Result<Self, InspectionError> {
        let Value::Array(items) = ctx.payload else {
            return Err(ctx.invalid(format!("expected an array, found {}", ctx.payload)));
        };
        if items.is_empty() {
            return Err(ctx.invalid("enumeration is empty"));
        }

        let coercer = ctx.coercer();
        let members = items
            .iter()
            .map(|item| coercer.coerce_payload(item).map_err(|e| ctx.invalid(e)))
            .collect::<Result<Vec<_>, _>>()?;

        let members_text = members
            .iter()
            .map(TypedValue::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(Self {
            base: ctx.base(ENUMERABLE_CONSTRAINT),
            coercer,
            members,
            members_text,
        })
    }

    fn is_member(&self, value: &TypedValue) -> bool {
        self.members
            .iter()
            .any(|member| member == value || member.compare(value) == Some(Ordering::Equal))
    }
}

impl CellValidator for EnumValidator {
    fn code(&self) -> &'static str {
        ENUMERABLE_CONSTRAINT
    }

    fn base(&self) -> &ValidatorBase {
        &self.base
    }

    /// Cells that do not coerce are left to the type and format check.
    fn filter(&self, cell: Option<&Cell>) -> bool {
        self.coercer.coerce_cell(cell).is_ok()
    }

    fn check_cell(&self, cell: Option<&Cell>) -> bool {
        match self.coercer.coerce_cell(cell) {
            Ok(TypedValue::Null) => true,
            Ok(value) => self.is_member(&value),
            Err(_) => false,
        }
    }

    fn lookup(&self) -> Vec<(&'static str, String)> {
        vec![("constraint", format!("[{}]", self.members_text))]
    }
}
