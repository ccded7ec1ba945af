//! 股票代码数据模型
//!
//! 定义交易所、板块、带后缀的股票代码以及结果映射表

use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 交易所
///
/// 后缀用于区分同一代码在不同交易所的上市
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exchange {
    /// 上海证券交易所
    Shanghai,
    /// 深圳证券交易所
    Shenzhen,
    /// 北京证券交易所
    Beijing,
}

impl Exchange {
    /// 代码后缀（SS / SZ / BJ）
    pub fn suffix(&self) -> &'static str {
        match self {
            Exchange::Shanghai => "SS",
            Exchange::Shenzhen => "SZ",
            Exchange::Beijing => "BJ",
        }
    }

    /// 根据后缀解析交易所
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "SS" => Some(Exchange::Shanghai),
            "SZ" => Some(Exchange::Shenzhen),
            "BJ" => Some(Exchange::Beijing),
            _ => None,
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// 板块
///
/// 聚合时按 [`Segment::ALL`] 的顺序依次获取
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// 沪市主板A股
    ShanghaiMain,
    /// 深市A股（主板、创业板）
    Shenzhen,
    /// 科创板
    StarMarket,
    /// 北交所
    Beijing,
}

impl Segment {
    /// 固定的获取顺序
    pub const ALL: [Segment; 4] = [
        Segment::ShanghaiMain,
        Segment::Shenzhen,
        Segment::StarMarket,
        Segment::Beijing,
    ];

    /// 所属交易所
    pub fn exchange(&self) -> Exchange {
        match self {
            Segment::ShanghaiMain | Segment::StarMarket => Exchange::Shanghai,
            Segment::Shenzhen => Exchange::Shenzhen,
            Segment::Beijing => Exchange::Beijing,
        }
    }

    /// 中文名称，用于日志和错误信息
    pub fn label(&self) -> &'static str {
        match self {
            Segment::ShanghaiMain => "沪市主板A股",
            Segment::Shenzhen => "深市A股",
            Segment::StarMarket => "科创板",
            Segment::Beijing => "北交所",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 带交易所后缀的股票代码，如 `600519.SS`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TickerSymbol {
    /// 纯数字代码
    pub code: String,
    /// 交易所
    pub exchange: Exchange,
}

impl TickerSymbol {
    pub fn new(code: impl Into<String>, exchange: Exchange) -> Self {
        Self {
            code: code.into(),
            exchange,
        }
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.code, self.exchange)
    }
}

impl FromStr for TickerSymbol {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (code, suffix) = s
            .rsplit_once('.')
            .ok_or_else(|| anyhow!("股票代码缺少交易所后缀: {}", s))?;

        if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(anyhow!("股票代码格式错误: {}", s));
        }

        let exchange =
            Exchange::from_suffix(suffix).ok_or_else(|| anyhow!("未知的交易所后缀: {}", suffix))?;

        Ok(Self::new(code, exchange))
    }
}

impl Serialize for TickerSymbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TickerSymbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 结果映射表：股票代码 -> 股票简称
///
/// 保持插入顺序；重复写入时覆盖原值但保留原位置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolMap(IndexMap<TickerSymbol, String>);

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一条记录，返回被覆盖的旧名称
    pub fn insert(&mut self, symbol: TickerSymbol, name: String) -> Option<String> {
        self.0.insert(symbol, name)
    }

    pub fn contains(&self, symbol: &TickerSymbol) -> bool {
        self.0.contains_key(symbol)
    }

    #[cfg(test)]
    pub fn get(&self, symbol: &TickerSymbol) -> Option<&str> {
        self.0.get(symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TickerSymbol, &str)> {
        self.0.iter().map(|(k, v)| (k, v.as_str()))
    }
}
