//! 结果输出
//!
//! 支持单行 JSON、`代码,交易所` 列表和 TypeScript 常量模块三种格式

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

use crate::config::OutputFormat;
use crate::models::SymbolMap;
use crate::services::listing::get_beijing_time;

fn code_list_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{6}\.(SS|SZ)$").expect("valid code list regex"))
}

/// 按格式渲染映射表
pub fn render(symbols: &SymbolMap, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => render_json(symbols),
        OutputFormat::CodeList => Ok(render_code_list(symbols)),
        OutputFormat::Typescript => render_typescript(symbols),
    }
}

/// 单行 JSON，中文不转义
pub fn render_json(symbols: &SymbolMap) -> Result<String> {
    serde_json::to_string(symbols).context("序列化股票映射表失败")
}

/// 每行 `600519,ss`，只包含 6 位沪深代码
pub fn render_code_list(symbols: &SymbolMap) -> String {
    symbols
        .iter()
        .map(|(symbol, _)| symbol.to_string())
        .filter(|key| code_list_regex().is_match(key))
        .filter_map(|key| {
            key.split_once('.')
                .map(|(code, exchange)| format!("{},{}", code, exchange.to_lowercase()))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// TypeScript 常量模块
pub fn render_typescript(symbols: &SymbolMap) -> Result<String> {
    let body = serde_json::to_string_pretty(symbols).context("序列化股票映射表失败")?;

    Ok(format!(
        r#"// 自动生成时间：{time}
// 股票总数：{count}

export const AShareNameMap: Record<string, string> = {body};

export const getStockName = (symbol: string): string => {{
  return AShareNameMap[symbol] || symbol;
}};

export const getAllStocks = (): Array<{{symbol: string, name: string}}> => {{
  return Object.entries(AShareNameMap).map(([symbol, name]) => ({{
    symbol,
    name
  }}));
}};
"#,
        time = get_beijing_time(),
        count = symbols.len(),
        body = body,
    ))
}

/// 写到文件或标准输出（末尾补换行）
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let mut text = content.to_string();
            if !text.ends_with('\n') {
                text.push('\n');
            }
            fs::write(path, text).with_context(|| format!("写入文件 {} 失败", path.display()))?;
            log::info!("已写入 {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content).context("写入标准输出失败")?;
            handle.flush().context("写入标准输出失败")?;
        }
    }
    Ok(())
}
