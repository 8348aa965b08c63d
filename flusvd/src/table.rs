//! CSV tables.
//!
//! Input tables are read whole into memory and checked column by column;
//! output tables are written to a temporary file next to the destination and
//! renamed into place once complete.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use csv::StringRecord;
use serde::Serialize;
use crate::error::{preview, Error, Result};

/// Field contents treated as missing values.
pub const NULL_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Checks if a field is a missing value.
pub fn is_null(field: &str) -> bool
{
    NULL_TOKENS.contains(&field.trim())
}

//

/// CSV table with a header row.
#[derive(Debug, Clone)]
pub struct Table
{
    name: String,
    headers: Vec<String>,
    records: Vec<StringRecord>,
}

impl Table
{
    /// Reads a table from a file.
    ///
    /// * `path` is the CSV file.
    /// * `name` is used in error messages.
    pub fn read(path: &Path, name: &str) -> Result<Self>
    {
        if !path.is_file() {
            return Err(Error::MissingInput {
                what: format!("{} input", name),
                tried: vec![path.to_path_buf()],
            });
        }

        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(), source,
        })?;
        log::debug!("reading {} from {}", name, path.display());

        Self::from_reader(file, name).map_err(|e| match e {
            Error::Csv {source, ..} => Error::Csv {path: path.to_path_buf(), source},
            e => e,
        })
    }

    /// Reads a table from the first existing file of `candidates`.
    pub fn read_first(candidates: &[PathBuf], name: &str) -> Result<(Self, PathBuf)>
    {
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Ok((Self::read(path, name)?, path.clone())),
            None => Err(Error::MissingInput {
                what: format!("{} file", name),
                tried: candidates.to_vec(),
            }),
        }
    }

    /// Reads a table from any reader.
    pub fn from_reader<R: Read>(rdr: R, name: &str) -> Result<Self>
    {
        let csv_err = |source| Error::Csv {path: PathBuf::from(name), source};

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(rdr);

        let headers = rdr.headers()
            .map_err(csv_err)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let records = rdr.records()
            .collect::<core::result::Result<Vec<_>, _>>()
            .map_err(csv_err)?;

        Ok(Table {
            name: name.to_string(),
            headers,
            records,
        })
    }

    /// Name used in error messages.
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Column names.
    pub fn headers(&self) -> &[String]
    {
        &self.headers
    }

    /// Number of data rows.
    pub fn len(&self) -> usize
    {
        self.records.len()
    }

    /// Checks if there is no data row.
    pub fn is_empty(&self) -> bool
    {
        self.records.is_empty()
    }

    /// Checks if a column exists.
    pub fn has_column(&self, column: &str) -> bool
    {
        self.headers.iter().any(|h| h == column)
    }

    /// Fails with [`Error::SchemaError`] naming every absent column of `columns`.
    pub fn require(&self, columns: &[&str]) -> Result<()>
    {
        let missing: Vec<String> = columns.iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        }
        else {
            Err(Error::SchemaError {
                table: self.name.clone(),
                missing,
            })
        }
    }

    /// First of `candidates` that is a column of the table.
    pub fn pick_column(&self, candidates: &[String]) -> Result<String>
    {
        candidates.iter()
            .find(|c| self.has_column(c))
            .cloned()
            .ok_or_else(|| Error::SchemaError {
                table: self.name.clone(),
                missing: vec![format!("one of [{}]", candidates.join(", "))],
            })
    }

    /// Parses a column.
    ///
    /// Returns one entry per data row, `None` for missing values (see [`is_null`]).
    /// Fails with [`Error::ParseError`] listing the offending rows
    /// if `parse` rejects any non-missing value.
    pub fn column<T, P>(&self, column: &str, parse: P) -> Result<Vec<Option<T>>>
    where P: Fn(&str) -> Option<T>
    {
        self.require(&[column])?;
        let idx = self.headers.iter().position(|h| h == column).unwrap_or_default();

        let mut values = Vec::with_capacity(self.records.len());
        let mut bad = Vec::new();

        for (i, rec) in self.records.iter().enumerate() {
            let field = rec.get(idx).unwrap_or("");

            if is_null(field) {
                values.push(None);
            }
            else if let Some(v) = parse(field.trim()) {
                values.push(Some(v));
            }
            else {
                // header is line 1
                bad.push(format!("line {}: {:?}", i + 2, field));
                values.push(None);
            }
        }

        if bad.is_empty() {
            Ok(values)
        }
        else {
            Err(Error::ParseError {
                table: self.name.clone(),
                column: column.to_string(),
                count: bad.len(),
                preview: preview(&bad),
            })
        }
    }

    /// Text of a column, trimmed.
    pub fn text_column(&self, column: &str) -> Result<Vec<Option<String>>>
    {
        self.column(column, |s| Some(s.to_string()))
    }
}

//

/// Parses a finite number.
pub fn parse_f64(s: &str) -> Option<f64>
{
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses an integer, also accepting a float notation without fraction such as `3.0`.
pub fn parse_i64(s: &str) -> Option<i64>
{
    s.parse::<i64>().ok().or_else(|| {
        parse_f64(s)
            .filter(|v| v.fract() == 0. && v.abs() < 9.0e15)
            .map(|v| v as i64)
    })
}

//

/// Permission bits of written files on Unix.
pub const OUTPUT_MODE: u32 = 0o644;

/// Writes rows to a CSV file atomically.
///
/// The parent directory is created if needed. The file appears at `path` only
/// after every row has been written; on failure `path` is left untouched.
/// On Unix the file gets [`OUTPUT_MODE`] permissions.
/// * `headers` is the header row, in the field order of `S`.
pub fn write_atomic<S: Serialize>(path: &Path, headers: &[&str], rows: &[S]) -> Result<()>
{
    let io_err = |source| Error::Io {path: path.to_path_buf(), source};
    let csv_err = |source| Error::Csv {path: path.to_path_buf(), source};

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(tmp);

    wtr.write_record(headers).map_err(csv_err)?;
    for row in rows {
        wtr.serialize(row).map_err(csv_err)?;
    }

    let tmp = wtr.into_inner().map_err(|e| io_err(e.into_error()))?;
    // temporary files are created owner-only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file().set_permissions(fs::Permissions::from_mode(OUTPUT_MODE)).map_err(io_err)?;
    }
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    log::debug!("wrote {} rows to {}", rows.len(), path.display());

    Ok(())
}

//
