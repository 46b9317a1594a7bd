//! `DataFrame` module for named-column tabular input.
//!
//! Cells are kept as the raw strings read from CSV; typed views are produced
//! on demand. An empty cell or a [`MISSING_TOKENS`] marker is a missing
//! value, never zero. Numeric cells must be finite.

use std::io::Read;
use std::path::Path;

use crate::error::{HatError, Result};
use crate::primitives::Matrix;

/// Name of the row-index column written by the dataset exporters.
pub const INDEX_COLUMN: &str = "Index";

/// Cell markers read as missing values, on top of the empty cell.
pub const MISSING_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || MISSING_TOKENS.contains(&cell)
}

/// A minimal `DataFrame` with named columns of raw CSV cells.
///
/// # Examples
///
/// ```
/// use sorting_hat::data::DataFrame;
///
/// let csv = "Index,Hogwarts House,Astronomy\n0,Ravenclaw,-487.5\n1,Slytherin,\n";
/// let df = DataFrame::from_reader(csv.as_bytes()).expect("valid CSV");
/// assert_eq!(df.shape(), (2, 3));
/// assert_eq!(df.numeric_column("Astronomy").expect("column exists"), vec![Some(-487.5), None]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataFrame {
    /// Creates a `DataFrame` from a header and rows of cells.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no columns, a column name is empty or
    /// duplicated, or a row length differs from the header.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if columns.is_empty() {
            return Err(HatError::InvalidInput(
                "DataFrame must have at least one column".into(),
            ));
        }
        for (i, name) in columns.iter().enumerate() {
            if name.is_empty() {
                return Err(HatError::InvalidInput("Column names cannot be empty".into()));
            }
            if columns[..i].contains(name) {
                return Err(HatError::InvalidInput(format!(
                    "Duplicate column name '{name}'"
                )));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(HatError::DimensionMismatch {
                    expected: format!("{} cells per row", columns.len()),
                    actual: format!("row {i} has {} cells", row.len()),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Reads a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let df = Self::from_reader(file)?;
        tracing::debug!(
            path = %path.display(),
            rows = df.n_rows(),
            cols = df.n_cols(),
            "loaded dataset"
        );
        Ok(df)
    }

    /// Reads CSV with a header row from any reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV is malformed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::new(columns, rows)
    }

    /// Returns the shape as (`n_rows`, `n_cols`).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column names.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).collect()
    }

    /// Returns true if a column with this name exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| {
                HatError::InvalidInput(format!(
                    "Column '{name}' not found; available columns: {:?}",
                    self.columns
                ))
            })
    }

    /// Returns a column as text; missing cells are `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the column doesn't exist.
    pub fn text_column(&self, name: &str) -> Result<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| Some(row[idx].as_str()).filter(|s| !is_missing(s)))
            .collect())
    }

    /// Returns a column parsed as numbers; missing cells are `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the column doesn't exist or a present cell is
    /// not a finite number.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| parse_cell(&row[idx], i, name))
            .collect()
    }

    /// Projects the named numeric columns, in the given order, into a matrix
    /// with missing cells preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if `names` is empty, a column doesn't exist or
    /// holds a non-numeric cell.
    pub fn select_numeric<S: AsRef<str>>(&self, names: &[S]) -> Result<Matrix<Option<f64>>> {
        if names.is_empty() {
            return Err(HatError::InvalidInput(
                "Must select at least one column".into(),
            ));
        }
        let indices = names
            .iter()
            .map(|n| self.column_index(n.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let mut data = Vec::with_capacity(self.n_rows() * indices.len());
        for (i, row) in self.rows.iter().enumerate() {
            for (&idx, name) in indices.iter().zip(names) {
                data.push(parse_cell(&row[idx], i, name.as_ref())?);
            }
        }
        Matrix::from_vec(self.n_rows(), indices.len(), data)
    }

    /// Gathers the given rows, in the given order, into a new `DataFrame`
    /// with the same columns.
    ///
    /// # Errors
    ///
    /// Returns an error if an index is out of bounds.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        let rows = indices
            .iter()
            .map(|&i| {
                self.rows.get(i).cloned().ok_or_else(|| {
                    HatError::InvalidInput(format!(
                        "row {i} out of bounds for {} rows",
                        self.n_rows()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Names of columns whose present cells all parse as finite numbers,
    /// excluding the row-index column.
    #[must_use]
    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, name)| name.as_str() != INDEX_COLUMN)
            .filter(|(idx, _)| {
                self.rows
                    .iter()
                    .enumerate()
                    .all(|(i, row)| parse_cell(&row[*idx], i, "").is_ok())
            })
            .map(|(_, name)| name.as_str())
            .collect()
    }
}

fn parse_cell(cell: &str, row: usize, column: &str) -> Result<Option<f64>> {
    if is_missing(cell) {
        return Ok(None);
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        Ok(_) => Err(HatError::InvalidInput(format!(
            "row {row}, column '{column}': '{cell}' is not a finite number"
        ))),
        Err(_) => Err(HatError::InvalidInput(format!(
            "row {row}, column '{column}': '{cell}' is not a number"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Index,Hogwarts House,First Name,Astronomy,Herbology
0,Ravenclaw,Tamara,-487.88,5.72
1,Slytherin,Erich,-552.06,
2,Gryffindor,Stephany,,-5.99
";

    fn sample() -> DataFrame {
        DataFrame::from_reader(SAMPLE.as_bytes()).expect("sample CSV is valid")
    }

    #[test]
    fn test_from_reader_shape() {
        let df = sample();
        assert_eq!(df.shape(), (3, 5));
        assert_eq!(
            df.column_names(),
            vec!["Index", "Hogwarts House", "First Name", "Astronomy", "Herbology"]
        );
    }

    #[test]
    fn test_numeric_column_missing_is_none() {
        let df = sample();
        let herbology = df.numeric_column("Herbology").expect("exists");
        assert_eq!(herbology, vec![Some(5.72), None, Some(-5.99)]);
    }

    #[test]
    fn test_na_tokens_are_missing() {
        let csv = "House,Astronomy\nSlytherin,-5\nNA,NaN\nRavenclaw,nan\nnull,1.5\n";
        let df = DataFrame::from_reader(csv.as_bytes()).expect("valid CSV");

        assert_eq!(
            df.numeric_column("Astronomy").expect("exists"),
            vec![Some(-5.0), None, None, Some(1.5)]
        );
        assert_eq!(
            df.text_column("House").expect("exists"),
            vec![Some("Slytherin"), None, Some("Ravenclaw"), None]
        );
        assert_eq!(df.numeric_column_names(), vec!["Astronomy"]);
    }

    #[test]
    fn test_infinite_cells_rejected() {
        for cell in ["inf", "-inf", "infinity", "1e400"] {
            let csv = format!("Astronomy\n1.0\n{cell}\n");
            let df = DataFrame::from_reader(csv.as_bytes()).expect("valid CSV");
            let err = df.numeric_column("Astronomy").expect_err(cell);
            assert!(err.to_string().contains("not a finite number"), "{cell}: {err}");
            assert!(df.select_numeric(&["Astronomy"]).is_err());
            assert!(df.numeric_column_names().is_empty());
        }
    }

    #[test]
    fn test_select_rows() {
        let df = sample();
        let picked = df.select_rows(&[2, 0]).expect("in bounds");
        assert_eq!(picked.column_names(), df.column_names());
        assert_eq!(
            picked.numeric_column("Herbology").expect("exists"),
            vec![Some(-5.99), Some(5.72)]
        );
        assert!(df.select_rows(&[3]).is_err());
    }

    #[test]
    fn test_numeric_column_rejects_text() {
        let df = sample();
        let err = df.numeric_column("First Name").expect_err("text column");
        assert!(err.to_string().contains("'Tamara' is not a number"));
    }

    #[test]
    fn test_text_column() {
        let df = sample();
        let houses = df.text_column("Hogwarts House").expect("exists");
        assert_eq!(houses, vec![Some("Ravenclaw"), Some("Slytherin"), Some("Gryffindor")]);
    }

    #[test]
    fn test_missing_column_lists_available() {
        let df = sample();
        let err = df.numeric_column("Potions").expect_err("absent");
        let msg = err.to_string();
        assert!(msg.contains("Potions"));
        assert!(msg.contains("Astronomy"));
    }

    #[test]
    fn test_select_numeric_respects_order() {
        let df = sample();
        let m = df.select_numeric(&["Herbology", "Astronomy"]).expect("valid");
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m.row(0), &[Some(5.72), Some(-487.88)]);
        assert_eq!(m.row(2), &[Some(-5.99), None]);
    }

    #[test]
    fn test_select_numeric_empty_names() {
        let df = sample();
        let names: [&str; 0] = [];
        assert!(df.select_numeric(&names).is_err());
    }

    #[test]
    fn test_numeric_column_names_skips_index_and_text() {
        let df = sample();
        assert_eq!(df.numeric_column_names(), vec!["Astronomy", "Herbology"]);
    }

    #[test]
    fn test_new_rejects_duplicates_and_ragged_rows() {
        let dup = DataFrame::new(vec!["a".into(), "a".into()], vec![]);
        assert!(dup.is_err());
        let ragged = DataFrame::new(vec!["a".into(), "b".into()], vec![vec!["1".into()]]);
        assert!(matches!(ragged, Err(HatError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_malformed_csv_is_reported() {
        let bad = "a,b\n1,2\n3\n";
        let err = DataFrame::from_reader(bad.as_bytes()).expect_err("unequal record lengths");
        assert!(matches!(err, HatError::Csv(_)));
    }
}
