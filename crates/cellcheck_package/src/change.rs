//! Column structural change notifications.

use serde::{Deserialize, Serialize};

/// A structural column change, delivered after the column model mutation has
/// been committed.
///
/// Deserializes from the editing layer's notification shape:
///
/// ```rust
/// use cellcheck_package::ColumnChange;
///
/// let change: ColumnChange = serde_json::from_str(
///     r#"{"kind": "split", "columnIndex": 1, "columnNames": ["First", "Last"], "removeOriginal": true}"#,
/// )
/// .unwrap();
/// assert_eq!(change.kind(), "split");
///
/// let unknown: ColumnChange = serde_json::from_str(r#"{"kind": "rename"}"#).unwrap();
/// assert_eq!(unknown, ColumnChange::Unknown);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnChange {
    /// A column was inserted at `column_index`
    #[serde(rename_all = "camelCase")]
    Add {
        /// Position of the new column
        column_index: usize,
        /// Name of the new column
        column_name: String,
    },

    /// The column at `column_index` was removed
    #[serde(rename_all = "camelCase")]
    Remove {
        /// Former position of the column
        column_index: usize,
    },

    /// The column at `column_index` was moved to `new_index`
    #[serde(rename_all = "camelCase")]
    Move {
        /// Former position
        column_index: usize,
        /// Position after the move
        new_index: usize,
    },

    /// The whole column order was replaced
    #[serde(rename_all = "camelCase")]
    Reorder {
        /// Column names in their new order
        column_names: Vec<String>,
    },

    /// The column at `column_index` was split into new columns placed after it
    #[serde(rename_all = "camelCase")]
    Split {
        /// Position of the origin column
        column_index: usize,
        /// Names of the resulting columns, in order
        column_names: Vec<String>,
        /// Whether the origin column was removed
        #[serde(default)]
        remove_original: bool,
    },

    /// Any change kind the synchronizer does not handle
    #[serde(other)]
    Unknown,
}

impl ColumnChange {
    /// Returns the notification kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ColumnChange::Add { .. } => "add",
            ColumnChange::Remove { .. } => "remove",
            ColumnChange::Move { .. } => "move",
            ColumnChange::Reorder { .. } => "reorder",
            ColumnChange::Split { .. } => "split",
            ColumnChange::Unknown => "unknown",
        }
    }
}
