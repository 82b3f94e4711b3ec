//! CSV export and re-import of grouped tables and summaries.
//!
//! Tables are written one column per group (header = group key) with
//! replicate rows in order; shorter groups are padded with empty cells.
//! Transposed tables have one row per group instead, key first.
//! Missing values are written as `NaN`, which keeps them distinct from
//! padding when the file is read back.

use crate::data::{
    parse_ct, GroupSummary, GroupedDataset, Record, ReplicateGroup, ReplicateTable, Statistic,
    SummaryResult,
};
use crate::error::{DdctError, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Header of the key column in summary exports.
pub const LEGEND: &str = "Legend";

fn format_value(v: f64) -> String {
    format!("{}", v)
}

/// Write a replicate table to a CSV file.
///
/// # Arguments
/// * `table` - Delta-Ct or normalized values
/// * `path` - Output file
/// * `transpose` - One row per group instead of one column per group
pub fn write_table<T, P>(table: &T, path: P, transpose: bool) -> Result<()>
where
    T: ReplicateTable + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::create(path)?;
    write_table_to(table, file, transpose)?;
    tracing::debug!(path = %path.display(), groups = table.n_groups(), "wrote table");
    Ok(())
}

/// Write a replicate table to any sink.
pub fn write_table_to<T, W>(table: &T, writer: W, transpose: bool) -> Result<()>
where
    T: ReplicateTable + ?Sized,
    W: Write,
{
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    if transpose {
        for group in table.groups() {
            let mut row = Vec::with_capacity(group.values.len() + 1);
            row.push(group.name.clone());
            row.extend(group.values.iter().map(|v| format_value(*v)));
            wtr.write_record(&row)?;
        }
    } else {
        wtr.write_record(table.keys())?;
        let depth = table
            .groups()
            .iter()
            .map(|g| g.values.len())
            .max()
            .unwrap_or(0);
        for i in 0..depth {
            let row: Vec<String> = table
                .groups()
                .iter()
                .map(|g| g.values.get(i).map(|v| format_value(*v)).unwrap_or_default())
                .collect();
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Write a summary to a CSV file.
///
/// The first column, headed `Legend`, holds the group keys and each
/// further column one statistic. Transposed, `Legend` holds the
/// statistic names and each further column one group.
pub fn write_summary<P: AsRef<Path>>(summary: &SummaryResult, path: P, transpose: bool) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_summary_to(summary, file, transpose)?;
    tracing::debug!(path = %path.display(), "wrote summary");
    Ok(())
}

/// Write a summary to any sink.
pub fn write_summary_to<W: Write>(summary: &SummaryResult, writer: W, transpose: bool) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let cell = |g: &GroupSummary, stat: Statistic| g.get(stat).map(format_value).unwrap_or_default();

    if transpose {
        let mut header = vec![LEGEND.to_string()];
        header.extend(summary.keys().iter().map(|k| k.to_string()));
        wtr.write_record(&header)?;
        for stat in summary.statistics() {
            let mut row = vec![stat.name().to_string()];
            row.extend(summary.groups().iter().map(|g| cell(g, *stat)));
            wtr.write_record(&row)?;
        }
    } else {
        let mut header = vec![LEGEND.to_string()];
        header.extend(summary.statistics().iter().map(|s| s.name().to_string()));
        wtr.write_record(&header)?;
        for group in summary.groups() {
            let mut row = vec![group.group.clone()];
            row.extend(summary.statistics().iter().map(|s| cell(group, *s)));
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Load a previously exported table.
///
/// Group keys come from the header row (or the first column when
/// `transposed`); each record is named after its group. The run id is
/// the file stem.
pub fn read_table<P: AsRef<Path>>(path: P, transposed: bool) -> Result<GroupedDataset> {
    let path = path.as_ref();
    let id = file_stem(path);
    read_table_from(id, File::open(path)?, transposed)
}

/// Load an exported table from any source.
pub fn read_table_from<R: Read>(id: impl Into<String>, reader: R, transposed: bool) -> Result<GroupedDataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let rows = rdr
        .records()
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

    let groups = if transposed {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| !row.is_empty())
            .map(|(row_idx, row)| -> Result<ReplicateGroup> {
                let name = row[0].to_string();
                let records = row
                    .iter()
                    .skip(1)
                    .filter(|cell| !cell.is_empty())
                    .map(|cell| -> Result<Record> {
                        Ok(Record::new(name.clone(), parse_ct(cell, row_idx + 1)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(ReplicateGroup { name, records })
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        let header = rows
            .first()
            .ok_or_else(|| DdctError::EmptyData("table has no header row".to_string()))?;
        let mut groups: Vec<ReplicateGroup> = header
            .iter()
            .map(|name| ReplicateGroup {
                name: name.to_string(),
                records: Vec::new(),
            })
            .collect();
        for (row_idx, row) in rows.iter().enumerate().skip(1) {
            for (col, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                let group = groups.get_mut(col).ok_or_else(|| {
                    DdctError::InvalidParameter(format!(
                        "Row {} has more cells than the header has groups",
                        row_idx
                    ))
                })?;
                let ct = parse_ct(cell, row_idx)?;
                group.records.push(Record::new(group.name.clone(), ct));
            }
        }
        groups
    };

    GroupedDataset::new(id, groups)
}

/// Load a previously exported summary.
pub fn read_summary<P: AsRef<Path>>(path: P, transposed: bool) -> Result<SummaryResult> {
    let path = path.as_ref();
    let id = file_stem(path);
    read_summary_from(id, File::open(path)?, transposed)
}

/// Load an exported summary from any source.
pub fn read_summary_from<R: Read>(id: impl Into<String>, reader: R, transposed: bool) -> Result<SummaryResult> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let header: Vec<String> = rdr.headers()?.iter().skip(1).map(String::from).collect();
    let rows = rdr
        .records()
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

    let parse_cell = |cell: &str, row: usize| -> Result<Option<f64>> {
        if cell.is_empty() {
            Ok(None)
        } else {
            parse_ct(cell, row).map(Some)
        }
    };

    if transposed {
        let mut groups: Vec<GroupSummary> = header.iter().map(GroupSummary::new).collect();
        let mut statistics = Vec::with_capacity(rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            let stat: Statistic = row.get(0).unwrap_or_default().parse()?;
            statistics.push(stat);
            for (group, cell) in groups.iter_mut().zip(row.iter().skip(1)) {
                if let Some(v) = parse_cell(cell, row_idx + 1)? {
                    group.set(stat, v);
                }
            }
        }
        Ok(SummaryResult::new(id, statistics, groups))
    } else {
        let statistics = header
            .iter()
            .map(|h| h.parse::<Statistic>())
            .collect::<Result<Vec<_>>>()?;
        let mut groups = Vec::with_capacity(rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            let mut group = GroupSummary::new(row.get(0).unwrap_or_default());
            for (stat, cell) in statistics.iter().zip(row.iter().skip(1)) {
                if let Some(v) = parse_cell(cell, row_idx + 1)? {
                    group.set(*stat, v);
                }
            }
            groups.push(group);
        }
        Ok(SummaryResult::new(id, statistics, groups))
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string())
}
