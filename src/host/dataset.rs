//! In-memory table behind the reference host
//!
//! Loaded with polars and stored column-major as wire values, so filtering,
//! sorting and paging operate on exactly what the grid receives. A synthetic
//! integer index column is always present and listed first.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::Path;

use polars::prelude::*;
use serde_json::Value;
use tracing::{debug, info};

use crate::column::{ColumnKind, ColumnSchema};
use crate::constants::{datetime, naming};
use crate::error::{GridError, Result};
use crate::format::datetime_to_wire;
use crate::protocol::Row;

/// Column-major table of wire values
#[derive(Debug, Clone)]
pub struct DataSet {
    schema: Vec<ColumnSchema>,
    columns: Vec<Vec<Value>>,
}

impl DataSet {
    /// Load data from a file (CSV or Parquet)
    pub fn load(path: &Path) -> Result<Self> {
        profiling::scope!("DataSet::load");
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| GridError::UnsupportedFormat {
                extension: String::new(),
            })?;

        let lf = match extension.to_lowercase().as_str() {
            "parquet" => LazyFrame::scan_parquet(path, ScanArgsParquet::default())?,
            "csv" => LazyCsvReader::new(path)
                .with_has_header(true)
                .with_infer_schema_length(Some(100))
                .with_try_parse_dates(true)
                .finish()?,
            ext => {
                return Err(GridError::UnsupportedFormat {
                    extension: ext.to_string(),
                });
            }
        };
        let df = lf.collect()?;
        info!(path = %path.display(), rows = df.height(), columns = df.width(), "dataset loaded");
        Self::from_dataframe(&df)
    }

    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let mut named = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let (kind, values) = series_values(series)?;
            named.push((series.name().to_string(), kind, values));
        }
        Self::from_columns(named)
    }

    /// Build from `(name, kind, values)` triples; every column must have the
    /// same length. The index column is added in front.
    pub fn from_columns(columns: Vec<(String, ColumnKind, Vec<Value>)>) -> Result<Self> {
        let height = columns.first().map_or(0, |(_, _, v)| v.len());
        if let Some((name, _, values)) = columns.iter().find(|(_, _, v)| v.len() != height) {
            return Err(GridError::Config(format!(
                "column '{}' has {} rows, expected {}",
                name,
                values.len(),
                height
            )));
        }

        let index_name = if columns.iter().any(|(n, _, _)| n == naming::INDEX_COLUMN) {
            "level_0"
        } else {
            naming::INDEX_COLUMN
        };
        let mut index = ColumnSchema::new(index_name, ColumnKind::Integer, 0);
        index.is_index = true;
        index.first_index = true;
        index.last_index = true;

        let mut schema = vec![index];
        let mut data = vec![(0..height).map(Value::from).collect::<Vec<_>>()];
        for (position, (name, kind, values)) in columns.into_iter().enumerate() {
            schema.push(ColumnSchema::new(name, kind, position + 1));
            data.push(values);
        }
        debug!(columns = schema.len(), rows = height, "dataset built");
        Ok(Self {
            schema,
            columns: data,
        })
    }

    pub fn schema(&self) -> &[ColumnSchema] {
        &self.schema
    }

    /// Mutable schema access for declaring constraints after loading
    pub fn schema_mut(&mut self) -> &mut [ColumnSchema] {
        &mut self.schema
    }

    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.schema
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| GridError::UnknownColumn {
                field: name.to_string(),
            })
    }

    pub fn column_values(&self, col: usize) -> &[Value] {
        self.columns.get(col).map_or(&[], Vec::as_slice)
    }

    pub fn value(&self, row: usize, col: usize) -> &Value {
        self.columns
            .get(col)
            .and_then(|c| c.get(row))
            .unwrap_or(&Value::Null)
    }

    pub fn set_value(&mut self, row: usize, col: usize, value: Value) -> Result<()> {
        let cell = self
            .columns
            .get_mut(col)
            .and_then(|c| c.get_mut(row))
            .ok_or_else(|| GridError::Host(format!("no cell at row {} column {}", row, col)))?;
        *cell = value;
        Ok(())
    }

    /// One row keyed by column name
    pub fn row(&self, row: usize) -> Row {
        self.schema
            .iter()
            .zip(&self.columns)
            .map(|(schema, values)| {
                (
                    schema.name.clone(),
                    values.get(row).cloned().unwrap_or(Value::Null),
                )
            })
            .collect()
    }

    /// Physical row holding `index` in the index column
    pub fn find_index(&self, index: &Value) -> Option<usize> {
        self.columns.first()?.iter().position(|v| v == index)
    }

    /// Append a copy of `source` with the next free index
    pub fn duplicate_row(&mut self, source: usize) -> Result<usize> {
        if source >= self.len() {
            return Err(GridError::EmptyDataset);
        }
        let next_index = self
            .column_values(0)
            .iter()
            .filter_map(Value::as_i64)
            .max()
            .map_or(0, |max| max + 1);
        for (col, values) in self.columns.iter_mut().enumerate() {
            let value = if col == 0 {
                Value::from(next_index)
            } else {
                values[source].clone()
            };
            values.push(value);
        }
        Ok(self.len() - 1)
    }

    /// Drop physical rows
    pub fn remove_rows(&mut self, rows: &BTreeSet<usize>) {
        for values in &mut self.columns {
            let mut position = 0;
            values.retain(|_| {
                let keep = !rows.contains(&position);
                position += 1;
                keep
            });
        }
    }
}

/// Convert one series into wire values and the column kind it maps to
fn series_values(series: &Series) -> Result<(ColumnKind, Vec<Value>)> {
    let dtype = series.dtype();
    let values: Vec<Value> = match dtype {
        DataType::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::from))
            .collect(),
        dt if dt.is_integer() => series
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::from))
            .collect(),
        dt if dt.is_float() => series
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| {
                v.and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            })
            .collect(),
        DataType::Date => series
            .date()?
            .into_iter()
            .map(|days| wire_datetime(days.map(|d| d as i64 * datetime::MILLIS_PER_DAY)))
            .collect(),
        DataType::Datetime(_, _) => series
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .datetime()?
            .into_iter()
            .map(wire_datetime)
            .collect(),
        _ => series
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::from))
            .collect(),
    };
    let kind = match dtype {
        DataType::Boolean => ColumnKind::Boolean,
        dt if dt.is_integer() => ColumnKind::Integer,
        dt if dt.is_float() => ColumnKind::Number,
        DataType::Date | DataType::Datetime(_, _) => ColumnKind::Datetime,
        _ => ColumnKind::String,
    };
    Ok((kind, values))
}

fn wire_datetime(ms: Option<i64>) -> Value {
    ms.and_then(datetime_to_wire).map_or(Value::Null, Value::String)
}

/// Type-aware ordering of two non-null cells
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Sort order for cells: nulls last in both directions
pub fn compare_cells(a: &Value, b: &Value, ascending: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = compare_values(a, b);
            if ascending { ord } else { ord.reverse() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_load_csv_adds_index() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "name,score,passed").unwrap();
        writeln!(file, "ann,1.5,true").unwrap();
        writeln!(file, "bob,2.25,false").unwrap();
        writeln!(file, "cy,,true").unwrap();
        file.flush().unwrap();

        let data = DataSet::load(file.path()).unwrap();
        assert_eq!(data.len(), 3);
        let kinds: Vec<(&str, ColumnKind)> = data
            .schema()
            .iter()
            .map(|c| (c.name.as_str(), c.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("index", ColumnKind::Integer),
                ("name", ColumnKind::String),
                ("score", ColumnKind::Number),
                ("passed", ColumnKind::Boolean),
            ]
        );
        assert!(data.schema()[0].is_index);
        assert_eq!(data.row(1).get("score"), Some(&json!(2.25)));
        assert_eq!(data.value(2, 2), &Value::Null);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        assert!(matches!(
            DataSet::load(file.path()),
            Err(GridError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = DataSet::from_columns(vec![
            ("a".into(), ColumnKind::Integer, vec![json!(1), json!(2)]),
            ("b".into(), ColumnKind::Integer, vec![json!(1)]),
        ]);
        assert!(matches!(result, Err(GridError::Config(_))));
    }

    #[test]
    fn test_duplicate_and_remove() {
        let mut data = DataSet::from_columns(vec![(
            "a".into(),
            ColumnKind::String,
            vec![json!("x"), json!("y")],
        )])
        .unwrap();
        let new_row = data.duplicate_row(1).unwrap();
        assert_eq!(new_row, 2);
        assert_eq!(data.value(2, 0), &json!(2));
        assert_eq!(data.value(2, 1), &json!("y"));

        data.remove_rows(&BTreeSet::from([0]));
        assert_eq!(data.len(), 2);
        assert_eq!(data.find_index(&json!(2)), Some(1));
    }

    #[test]
    fn test_nulls_sort_last() {
        let mut cells = vec![json!(3), Value::Null, json!(1.5), json!(10)];
        cells.sort_by(|a, b| compare_cells(a, b, true));
        assert_eq!(cells, vec![json!(1.5), json!(3), json!(10), Value::Null]);
        cells.sort_by(|a, b| compare_cells(a, b, false));
        assert_eq!(cells, vec![json!(10), json!(3), json!(1.5), Value::Null]);
    }
}
