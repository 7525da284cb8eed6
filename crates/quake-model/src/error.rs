use thiserror::Error;

use crate::schema::CanonicalColumn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown canonical column: {name}")]
    UnknownColumn { name: String },

    #[error("unknown provenance tag: {label}")]
    UnknownSource { label: String },

    /// A row cannot become a record because required fields are null.
    #[error("missing required field(s): {}", format_columns(.missing))]
    MissingRequired { missing: Vec<CanonicalColumn> },
}

fn format_columns(columns: &[CanonicalColumn]) -> String {
    columns
        .iter()
        .map(|column| column.name())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ModelError>;
