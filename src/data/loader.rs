use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, UInt32Array, UInt8Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::debug;

use super::model::{Channel, ExtremumKind, TensileSeries};
use crate::analysis::AnalyzedSeries;
use crate::config::ColumnNames;
use crate::error::{DataError, Error, Result};

// ---------------------------------------------------------------------------
// Ingestion: RecordBatch → TensileSeries
// ---------------------------------------------------------------------------

/// Build a validated series from one record batch.
///
/// Expected schema (names configurable through [`ColumnNames`]):
/// - `time_ms`, `time_s`, `strain`, `stress`: Float64, Float32, Int64 or Int32
/// - any other columns are ignored
///
/// Nulls are rejected; the series itself then checks lengths, finiteness and
/// strictly increasing time.
pub fn series_from_batch(batch: &RecordBatch, names: &ColumnNames) -> Result<TensileSeries> {
    series_from_batches(std::slice::from_ref(batch), names)
}

/// Build one validated series from consecutive record batches, e.g. the
/// batches of a streamed table.
pub fn series_from_batches(batches: &[RecordBatch], names: &ColumnNames) -> Result<TensileSeries> {
    let total: usize = batches.iter().map(|b| b.num_rows()).sum();
    let mut time_ms = Vec::with_capacity(total);
    let mut time_s = Vec::with_capacity(total);
    let mut strain = Vec::with_capacity(total);
    let mut stress = Vec::with_capacity(total);

    let mut offset = 0;
    for batch in batches {
        for (name, out) in [
            (&names.time_ms, &mut time_ms),
            (&names.time_s, &mut time_s),
            (&names.strain, &mut strain),
            (&names.stress, &mut stress),
        ] {
            let col = batch
                .column_by_name(name)
                .ok_or_else(|| Error::from(DataError::MissingColumn(name.clone())))?;
            out.extend(column_to_f64(name, col, offset)?);
        }
        offset += batch.num_rows();
    }

    debug!("ingested {total} rows from {} record batches", batches.len());
    TensileSeries::validated(names, time_ms, time_s, strain, stress)
}

fn column_to_f64(name: &str, col: &ArrayRef, offset: usize) -> Result<Vec<f64>> {
    let values: Vec<Option<f64>> = match col.data_type() {
        DataType::Float64 => downcast::<Float64Array>(name, col)?.iter().collect(),
        DataType::Float32 => downcast::<Float32Array>(name, col)?
            .iter()
            .map(|v| v.map(f64::from))
            .collect(),
        DataType::Int64 => downcast::<Int64Array>(name, col)?
            .iter()
            .map(|v| v.map(|i| i as f64))
            .collect(),
        DataType::Int32 => downcast::<Int32Array>(name, col)?
            .iter()
            .map(|v| v.map(f64::from))
            .collect(),
        other => {
            return Err(DataError::UnsupportedType {
                name: name.to_string(),
                found: format!("{other:?}"),
            }
            .into())
        }
    };

    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                Error::from(DataError::NullValue {
                    column: name.to_string(),
                    row: offset + row,
                })
            })
        })
        .collect()
}

fn downcast<'a, T: Array + 'static>(name: &str, col: &'a ArrayRef) -> Result<&'a T> {
    col.as_any().downcast_ref::<T>().ok_or_else(|| {
        Error::from(DataError::UnsupportedType {
            name: name.to_string(),
            found: format!("{:?}", col.data_type()),
        })
    })
}

// ---------------------------------------------------------------------------
// Export: AnalyzedSeries → RecordBatch
// ---------------------------------------------------------------------------

/// Name of a flag column, e.g. `strain_peak`.
pub fn flag_column_name(channel: Channel, kind: ExtremumKind) -> String {
    format!("{}_{kind}", channel.prefix())
}

/// Name of a cycle label column, e.g. `stress_cycle`.
pub fn cycle_column_name(channel: Channel) -> String {
    format!("{}_cycle", channel.prefix())
}

/// The input columns followed by the four flag columns (UInt8) and the two
/// cycle label columns (UInt32).
pub fn to_record_batch(analyzed: &AnalyzedSeries, names: &ColumnNames) -> Result<RecordBatch> {
    let series = analyzed.series();

    let mut fields = Vec::with_capacity(10);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(10);

    for (name, values) in [
        (&names.time_ms, series.time_ms()),
        (&names.time_s, series.time_s()),
        (&names.strain, series.strain()),
        (&names.stress, series.stress()),
    ] {
        fields.push(Field::new(name.as_str(), DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from(values.to_vec())));
    }

    for channel in Channel::ALL {
        for kind in [ExtremumKind::Peak, ExtremumKind::Trough] {
            fields.push(Field::new(flag_column_name(channel, kind), DataType::UInt8, false));
            columns.push(Arc::new(UInt8Array::from(analyzed.flags(channel, kind))));
        }
    }

    for channel in Channel::ALL {
        fields.push(Field::new(cycle_column_name(channel), DataType::UInt32, false));
        columns.push(Arc::new(UInt32Array::from(analyzed.labels(channel).to_vec())));
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    Ok(batch)
}
