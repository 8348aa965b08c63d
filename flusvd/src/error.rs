use std::path::PathBuf;
use flusvd_core::SvdError;

/// Number of offending rows or keys shown in an error message.
pub const PREVIEW_LEN: usize = 5;

/// Pipeline errors.
///
/// Every error is fatal to a run. Messages are single-line so that they can be
/// reported as one line on the error stream.
#[derive(Debug, thiserror::Error)]
pub enum Error
{
    /// Referenced input file is absent.
    #[error("MissingInput: {what} not found (tried: {})", display_paths(.tried))]
    MissingInput {
        what: String,
        tried: Vec<PathBuf>,
    },

    /// Required columns are absent from an input table.
    #[error("SchemaError: {table} is missing required columns: {}", .missing.join(", "))]
    SchemaError {
        table: String,
        missing: Vec<String>,
    },

    /// Unparseable values.
    #[error("ParseError: {count} invalid '{column}' values in {table}; e.g. {}", .preview.join("; "))]
    ParseError {
        table: String,
        column: String,
        count: usize,
        preview: Vec<String>,
    },

    /// Keys fail to match a reference table.
    #[error("JoinMismatch: {count} keys have no match in {reference}; e.g. {}", .preview.join(", "))]
    JoinMismatch {
        reference: String,
        count: usize,
        preview: Vec<String>,
    },

    /// Not enough usable data for the computation.
    #[error("InsufficientData: {0}")]
    InsufficientData(String),

    /// Invalid parameter.
    #[error("InvalidParam: {0}")]
    InvalidParam(String),

    /// Failure of the numeric core.
    #[error("Svd: {0}")]
    Svd(#[from] SvdError),

    #[error("Io: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Csv: {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Result alias of [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

fn display_paths(paths: &[PathBuf]) -> String
{
    paths.iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Leading [`PREVIEW_LEN`] items as strings.
pub(crate) fn preview<T: ToString>(items: &[T]) -> Vec<String>
{
    items.iter().take(PREVIEW_LEN).map(|i| i.to_string()).collect()
}

//

#[test]
fn test_error_message()
{
    let e = Error::SchemaError {
        table: "admissions".to_string(),
        missing: vec!["value".to_string()],
    };
    assert_eq!(e.to_string(), "SchemaError: admissions is missing required columns: value");

    let e = Error::JoinMismatch {
        reference: "locations".to_string(),
        count: 7,
        preview: preview(&["01", "02", "03", "04", "05", "06", "07"]),
    };
    let msg = e.to_string();
    println!("{}", msg);
    assert!(msg.contains("05"));
    assert!(!msg.contains("06"));
    assert!(!msg.contains('\n'));
}
