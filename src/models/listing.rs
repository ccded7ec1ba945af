//! 上市列表行模型
//!
//! 各数据源在边界处把原始表格转换为统一的 (代码, 简称) 行，
//! 聚合逻辑不再关心各接口的列名

use std::fmt;

/// 代码单元格
///
/// 深交所 Excel 中的代码可能是数字而非定长字符串
#[derive(Debug, Clone, PartialEq)]
pub enum CodeCell {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for CodeCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeCell::Text(s) => f.write_str(s),
            CodeCell::Integer(i) => write!(f, "{}", i),
            CodeCell::Float(v) => write!(f, "{}", v),
        }
    }
}

/// 上市列表中的一行
///
/// `None` 表示该单元格缺失或为空
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRow {
    /// 证券代码
    pub code: Option<CodeCell>,
    /// 证券简称
    pub name: Option<String>,
}

impl ListingRow {
    /// 由文本代码和简称构造，空字符串视为缺失
    pub fn from_text(code: Option<&str>, name: Option<&str>) -> Self {
        let code = code
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| CodeCell::Text(s.to_string()));
        let name = name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self { code, name }
    }
}
