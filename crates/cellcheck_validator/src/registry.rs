//! Constraint name to validator constructor mapping.

use crate::InspectionError;
use crate::checks::{
    BoundValidator, CellValidator, ConstraintContext, EnumValidator, LengthValidator,
    PatternValidator, RequiredValidator, UniqueValidator,
};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// `minimum` constraint key
pub const MINIMUM: &str = "minimum";
/// `maximum` constraint key
pub const MAXIMUM: &str = "maximum";
/// `minLength` constraint key
pub const MIN_LENGTH: &str = "minLength";
/// `maxLength` constraint key
pub const MAX_LENGTH: &str = "maxLength";
/// `pattern` constraint key
pub const PATTERN: &str = "pattern";
/// `enum` constraint key
pub const ENUM: &str = "enum";
/// `required` constraint key
pub const REQUIRED: &str = "required";
/// `unique` constraint key
pub const UNIQUE: &str = "unique";

/// Builds the validator of one declared constraint.
pub type ValidatorConstructor =
    fn(&ConstraintContext<'_>) -> Result<Arc<dyn CellValidator>, InspectionError>;

static SHARED: Lazy<Arc<ConstraintRegistry>> =
    Lazy::new(|| Arc::new(ConstraintRegistry::builtin()));

/// Immutable once shared; customize a registry before handing it to an
/// inspector.
///
/// ```rust
/// use cellcheck_validator::ConstraintRegistry;
///
/// let registry = ConstraintRegistry::shared();
/// assert!(registry.resolve("minimum").is_some());
/// assert!(registry.resolve("foobar").is_none());
/// ```
#[derive(Clone, Default)]
pub struct ConstraintRegistry {
    constructors: HashMap<String, ValidatorConstructor>,
}

impl std::fmt::Debug for ConstraintRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintRegistry")
            .field("constraints", &self.names())
            .finish()
    }
}

impl ConstraintRegistry {
    /// Creates a registry with no constraints.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in constraint.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry
            .register(MINIMUM, |ctx| Ok(Arc::new(BoundValidator::minimum(ctx)?)))
            .register(MAXIMUM, |ctx| Ok(Arc::new(BoundValidator::maximum(ctx)?)))
            .register(MIN_LENGTH, |ctx| Ok(Arc::new(LengthValidator::min_length(ctx)?)))
            .register(MAX_LENGTH, |ctx| Ok(Arc::new(LengthValidator::max_length(ctx)?)))
            .register(PATTERN, |ctx| Ok(Arc::new(PatternValidator::new(ctx)?)))
            .register(ENUM, |ctx| Ok(Arc::new(EnumValidator::new(ctx)?)))
            .register(REQUIRED, |ctx| Ok(Arc::new(RequiredValidator::new(ctx)?)))
            .register(UNIQUE, |ctx| Ok(Arc::new(UniqueValidator::new(ctx)?)));
        registry
    }

    /// Returns the process-wide built-in registry.
    pub fn shared() -> Arc<ConstraintRegistry> {
        Arc::clone(&SHARED)
    }

    /// Registers a constructor, replacing any previous one with the same name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        constructor: ValidatorConstructor,
    ) -> &mut Self {
        self.constructors.insert(name.into(), constructor);
        self
    }

    /// Looks up the constructor of a constraint.
    pub fn resolve(&self, name: &str) -> Option<ValidatorConstructor> {
        self.constructors.get(name).copied()
    }

    /// Returns true if a constraint is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered constraints.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}
