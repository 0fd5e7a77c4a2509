//! 表格读取服务 - 业务能力层
//!
//! 把 xlsx / xls / ods / csv 文件读成「列名 → 文本」的行

use crate::error::ImportError;
use crate::models::question::RawRow;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::debug;

/// 读取到的一个工作表
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    /// 表头行中的原始列名（去掉空列）
    pub headers: Vec<String>,
    /// 数据行，整行为空的已丢弃
    pub rows: Vec<RawRow>,
}

/// 支持的表格格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetFormat {
    Workbook,
    Csv,
}

fn detect_format(path: &Path) -> Option<SheetFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SheetFormat::Workbook),
        "csv" => Some(SheetFormat::Csv),
        _ => None,
    }
}

/// 读取文件的第一个工作表
pub fn read_sheet(path: &Path) -> Result<Sheet, ImportError> {
    let path_text = path.display().to_string();
    let sheet = match detect_format(path) {
        Some(SheetFormat::Workbook) => read_workbook(path)?,
        Some(SheetFormat::Csv) => read_csv(path)?,
        None => return Err(ImportError::UnsupportedFormat { path: path_text }),
    };

    debug!(
        "读取表格 {}: {} 列, {} 行",
        path_text,
        sheet.headers.len(),
        sheet.rows.len()
    );

    Ok(sheet)
}

fn read_workbook(path: &Path) -> Result<Sheet, ImportError> {
    let path_text = path.display().to_string();
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ImportError::workbook(path_text.clone(), e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::NoSheets {
            path: path_text.clone(),
        })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::workbook(path_text.clone(), e))?;

    let mut rows = range.rows();
    let header_cells: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(cell_text).collect(),
        None => return Ok(Sheet::default()),
    };

    Ok(build_sheet(
        header_cells,
        rows.map(|row| row.iter().map(cell_text).collect()),
    ))
}

fn read_csv(path: &Path) -> Result<Sheet, ImportError> {
    let path_text = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| ImportError::workbook(path_text.clone(), e))?;

    let header_cells: Vec<String> = reader
        .headers()
        .map_err(|e| ImportError::workbook(path_text.clone(), e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::workbook(path_text.clone(), e))?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    Ok(build_sheet(header_cells, records.into_iter()))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// 按表头把每行转成 `RawRow`
///
/// 缺失的单元格为空字符串，整行为空的丢弃
fn build_sheet(header_cells: Vec<String>, rows: impl Iterator<Item = Vec<String>>) -> Sheet {
    let columns: Vec<(usize, String)> = header_cells
        .into_iter()
        .enumerate()
        .map(|(idx, header)| (idx, header.trim_start_matches('\u{feff}').to_string()))
        .filter(|(_, header)| !header.trim().is_empty())
        .collect();

    let mut sheet = Sheet {
        headers: columns.iter().map(|(_, header)| header.clone()).collect(),
        rows: Vec::new(),
    };

    for cells in rows {
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut row = RawRow::with_capacity(columns.len());
        for (idx, header) in &columns {
            row.push(header.as_str(), cells.get(*idx).cloned().unwrap_or_default());
        }
        sheet.rows.push(row);
    }

    sheet
}
