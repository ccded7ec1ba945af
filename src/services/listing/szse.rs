//! 深交所A股列表
//!
//! 对应 akshare 的 stock_info_sz_name_code(symbol="A股列表")
//! 接口返回 xlsx 文件，A股代码列可能是数字

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use reqwest::Client;
use std::io::Cursor;
use url::Url;

use super::common::ensure_success;
use crate::models::{CodeCell, ListingRow, Segment};

/// 代码列表头
const CODE_HEADER: &str = "A股代码";
/// 简称列表头
const NAME_HEADER: &str = "A股简称";

/// 获取深交所A股列表
pub async fn fetch_szse_listings(
    client: &Client,
    base_url: &str,
    segment: Segment,
) -> Result<Vec<ListingRow>> {
    if segment != Segment::Shenzhen {
        return Err(anyhow!("深交所接口不提供{}列表", segment));
    }

    let url = Url::parse_with_params(
        base_url,
        &[
            ("SHOWTYPE", "xlsx"),
            ("CATALOGID", "1110"),
            ("TABKEY", "tab1"),
            ("random", "0.6935816432433362"),
        ],
    )?;

    log::debug!("请求{}列表 URL: {}", segment, url);

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("请求{}列表失败", segment))?;
    let response = ensure_success(response, segment)?;

    let bytes = response.bytes().await?;
    parse_szse_workbook(bytes.as_ref())
}

/// 解析深交所 Excel 文件（取第一个工作表）
fn parse_szse_workbook(bytes: &[u8]) -> Result<Vec<ListingRow>> {
    let cursor = Cursor::new(bytes);
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| anyhow!("打开Excel文件失败: {}", e))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names
        .first()
        .ok_or_else(|| anyhow!("Excel文件没有工作表"))?;

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| anyhow!("读取工作表失败: {}", e))?;

    parse_szse_range(&range)
}

/// 从工作表中按表头定位代码列和简称列
fn parse_szse_range(range: &Range<Data>) -> Result<Vec<ListingRow>> {
    let mut rows = range.rows();

    let (code_idx, name_idx) = loop {
        let row = rows
            .next()
            .ok_or_else(|| anyhow!("未找到表头: {} / {}", CODE_HEADER, NAME_HEADER))?;

        let code_idx = header_position(row, CODE_HEADER);
        let name_idx = header_position(row, NAME_HEADER);
        match (code_idx, name_idx) {
            (Some(c), Some(n)) => break (c, n),
            (Some(_), None) => return Err(anyhow!("表头缺少列: {}", NAME_HEADER)),
            _ => continue,
        }
    };

    let listings = rows
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| ListingRow {
            code: row.get(code_idx).and_then(code_cell),
            name: row.get(name_idx).and_then(name_cell),
        })
        .collect();

    Ok(listings)
}

fn header_position(row: &[Data], header: &str) -> Option<usize> {
    row.iter()
        .position(|cell| matches!(cell, Data::String(s) if s.trim() == header))
}

fn code_cell(cell: &Data) -> Option<CodeCell> {
    match cell {
        Data::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| CodeCell::Text(s.to_string()))
        }
        Data::Int(i) => Some(CodeCell::Integer(*i)),
        Data::Float(f) if f.is_nan() => None,
        Data::Float(f) => Some(CodeCell::Float(*f)),
        Data::Empty | Data::Error(_) => None,
        // 日期等类型无法转换为代码，交给归一化时报错
        other => Some(CodeCell::Text(format!("{:?}", other))),
    }
}

fn name_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if !f.is_nan() => Some(f.to_string()),
        _ => None,
    }
}
