use std::path::PathBuf;

use thiserror::Error;

/// Instance data that does not fit the declared sets and parameter domains.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("{set} declares `{name}` more than once")]
    DuplicateEntity { set: &'static str, name: String },
    #[error("{param}[{index}] is not defined")]
    MissingValue { param: &'static str, index: String },
    #[error("{param}[{index}] is defined more than once")]
    DuplicateValue { param: &'static str, index: String },
    #[error("{param}[{index}] is indexed outside its domain")]
    UnknownIndex { param: &'static str, index: String },
    #[error("{param}[{index}] = {value} is not in {domain}")]
    OutOfDomain {
        param: &'static str,
        index: String,
        value: String,
        domain: &'static str,
    },
}

/// Index domains of variables or constraints that do not line up.
#[derive(Debug, Error, PartialEq)]
pub enum ConstructionError {
    #[error("variable slot {0} allocated twice")]
    DuplicateSlot(String),
    #[error("expected {expected} deployment slots, allocated {allocated}")]
    MissingSlots { expected: usize, allocated: usize },
    #[error("constraint {constraint} references unknown variable #{var}")]
    UnknownVariable { constraint: String, var: usize },
}

/// Failure to go from raw instance data to a model.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Failure to read instance files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{}:{line}: expected {expected} fields, found {found}", .path.display())]
    FieldCount {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("{}:{line}: cannot parse {field} from `{value}`", .path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        field: &'static str,
        value: String,
    },
}
