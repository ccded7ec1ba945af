//! 股票代码聚合服务
//!
//! 按固定顺序获取四个板块，筛选并归一化代码后合并为一张映射表
//!
//! ## 板块规则
//! - 沪市主板：代码以 6 开头，后缀 .SS
//! - 深市A股：跳过代码或简称缺失的行，代码转整数后补零到 6 位，以 0 或 3 开头，后缀 .SZ
//! - 科创板：代码以 688 开头，后缀 .SS
//! - 北交所：不筛选，后缀 .BJ
//!
//! 任一板块失败即停止后续板块，返回此前已完成板块的结果

use anyhow::{anyhow, Result};

use crate::config::DuplicatePolicy;
use crate::models::{
    AggregateReport, CodeCell, Exchange, ListingRow, Segment, SegmentFailure, SymbolMap,
    TickerSymbol,
};
use crate::services::listing::ListingSource;

/// 股票代码聚合器
pub struct SymbolAggregator {
    source: Box<dyn ListingSource>,
    duplicate_policy: DuplicatePolicy,
}

impl SymbolAggregator {
    pub fn new(source: Box<dyn ListingSource>, duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            source,
            duplicate_policy,
        }
    }

    /// 生成股票代码映射表
    ///
    /// 不返回错误：失败的板块记录在报告中，映射表只包含失败前已完成的板块
    pub async fn produce_symbol_map(&self) -> AggregateReport {
        let mut report = AggregateReport::default();

        for segment in Segment::ALL {
            log::info!("从 {} 获取{}列表", self.source.name(), segment);

            let result = match self.collect_segment(segment).await {
                Ok(entries) => self.merge(&mut report, entries),
                Err(e) => Err(e),
            };

            if let Err(error) = result {
                log::debug!("{}获取失败，停止后续板块: {:#}", segment, error);
                report.failure = Some(SegmentFailure {
                    segment: Some(segment),
                    error,
                });
                break;
            }

            report.completed.push(segment);
        }

        log::info!(
            "共获取 {} 只股票，完成 {}/{} 个板块",
            report.symbols.len(),
            report.completed.len(),
            Segment::ALL.len()
        );
        report
    }

    /// 获取并归一化一个板块的全部记录
    async fn collect_segment(&self, segment: Segment) -> Result<Vec<(TickerSymbol, String)>> {
        let rows = self.source.fetch_listings(segment).await?;
        let total = rows.len();

        let mut entries = Vec::with_capacity(total);
        for row in &rows {
            if let Some(entry) = normalize_row(segment, row)? {
                entries.push(entry);
            }
        }

        log::info!("{}: {} 行，保留 {} 只", segment, total, entries.len());
        Ok(entries)
    }

    /// 把一个板块的结果整体写入映射表
    fn merge(&self, report: &mut AggregateReport, entries: Vec<(TickerSymbol, String)>) -> Result<()> {
        if self.duplicate_policy == DuplicatePolicy::Reject {
            let mut batch = SymbolMap::new();
            for (symbol, name) in &entries {
                let seen = report.symbols.contains(symbol)
                    || batch.insert(symbol.clone(), name.clone()).is_some();
                if seen {
                    return Err(anyhow!("重复的股票代码: {}", symbol));
                }
            }
        }

        for (symbol, name) in entries {
            let key = symbol.to_string();
            if let Some(old) = report.symbols.insert(symbol, name) {
                let warning = format!("股票代码 {} 重复，覆盖原简称 {}", key, old);
                log::warn!("{}", warning);
                report.warnings.push(warning);
            }
        }

        Ok(())
    }
}

/// 按板块规则处理一行，`None` 表示该行被筛除
pub fn normalize_row(segment: Segment, row: &ListingRow) -> Result<Option<(TickerSymbol, String)>> {
    let exchange = segment.exchange();

    match segment {
        Segment::ShanghaiMain => prefixed_entry(row, exchange, "6"),
        Segment::StarMarket => prefixed_entry(row, exchange, "688"),
        Segment::Shenzhen => {
            let (code, name) = match (&row.code, &row.name) {
                (Some(code), Some(name)) => (code, name),
                _ => return Ok(None),
            };

            let code = zero_pad_code(code)?;
            if code.starts_with('0') || code.starts_with('3') {
                Ok(Some((TickerSymbol::new(code, exchange), name.clone())))
            } else {
                Ok(None)
            }
        }
        Segment::Beijing => {
            let code = text_code(row)?.ok_or_else(|| anyhow!("北交所记录缺少证券代码"))?;
            let name = required_name(row, code)?;
            Ok(Some((TickerSymbol::new(code, exchange), name)))
        }
    }
}

/// 代码转整数后补零到 6 位
///
/// 小数截断取整；文本需为整数
pub fn zero_pad_code(code: &CodeCell) -> Result<String> {
    let value = match code {
        CodeCell::Integer(i) => *i,
        CodeCell::Float(f) => {
            if !f.is_finite() || f.abs() >= i64::MAX as f64 {
                return Err(anyhow!("无法将代码 {} 转换为整数", f));
            }
            f.trunc() as i64
        }
        CodeCell::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| anyhow!("无法将代码 {} 转换为整数", s))?,
    };

    Ok(format!("{:06}", value))
}

/// 代码以指定前缀开头时保留
fn prefixed_entry(
    row: &ListingRow,
    exchange: Exchange,
    prefix: &str,
) -> Result<Option<(TickerSymbol, String)>> {
    let code = match text_code(row)? {
        Some(code) if code.starts_with(prefix) => code,
        _ => return Ok(None),
    };

    let name = required_name(row, code)?;
    Ok(Some((TickerSymbol::new(code, exchange), name)))
}

fn text_code(row: &ListingRow) -> Result<Option<&str>> {
    match &row.code {
        Some(CodeCell::Text(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(anyhow!("证券代码不是文本: {}", other)),
        None => Ok(None),
    }
}

fn required_name(row: &ListingRow, code: &str) -> Result<String> {
    row.name
        .clone()
        .ok_or_else(|| anyhow!("证券 {} 缺少简称", code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn row(code: &str, name: &str) -> ListingRow {
        ListingRow::from_text(Some(code), Some(name))
    }

    fn sz_row(code: Option<CodeCell>, name: Option<&str>) -> ListingRow {
        ListingRow {
            code,
            name: name.map(str::to_string),
        }
    }

    /// 模拟数据源：每个板块返回预设结果，并记录请求顺序
    struct MockSource {
        responses: HashMap<Segment, std::result::Result<Vec<ListingRow>, String>>,
        calls: Arc<Mutex<Vec<Segment>>>,
    }

    impl MockSource {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn ok(mut self, segment: Segment, rows: Vec<ListingRow>) -> Self {
            self.responses.insert(segment, Ok(rows));
            self
        }

        fn fail(mut self, segment: Segment, message: &str) -> Self {
            self.responses.insert(segment, Err(message.to_string()));
            self
        }
    }

    #[async_trait]
    impl ListingSource for MockSource {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn fetch_listings(&self, segment: Segment) -> Result<Vec<ListingRow>> {
            self.calls.lock().unwrap().push(segment);
            match self.responses.get(&segment) {
                Some(Ok(rows)) => Ok(rows.clone()),
                Some(Err(message)) => Err(anyhow!("{}", message)),
                None => Ok(Vec::new()),
            }
        }
    }

    fn full_source() -> MockSource {
        MockSource::new()
            .ok(
                Segment::ShanghaiMain,
                vec![row("600519", "贵州茅台"), row("900901", "云赛B股"), row("601398", "工商银行")],
            )
            .ok(
                Segment::Shenzhen,
                vec![
                    sz_row(Some(CodeCell::Integer(1)), Some("平安银行")),
                    sz_row(Some(CodeCell::Float(300750.0)), Some("宁德时代")),
                    sz_row(Some(CodeCell::Integer(999999)), Some("测试")),
                    sz_row(None, Some("无代码")),
                    sz_row(Some(CodeCell::Integer(2)), None),
                ],
            )
            .ok(
                Segment::StarMarket,
                vec![row("688981", "中芯国际"), row("689009", "九号公司")],
            )
            .ok(Segment::Beijing, vec![row("430047", "诺思兰德"), row("830799", "艾融软件")])
    }

    // ==================== 板块规则 ====================

    #[test]
    fn test_shanghai_main_rule() {
        let entry = normalize_row(Segment::ShanghaiMain, &row("600519", "贵州茅台"))
            .unwrap()
            .unwrap();
        assert_eq!(entry.0.to_string(), "600519.SS");
        assert_eq!(entry.1, "贵州茅台");

        assert!(normalize_row(Segment::ShanghaiMain, &row("900901", "云赛B股"))
            .unwrap()
            .is_none());
        assert!(normalize_row(Segment::ShanghaiMain, &ListingRow::from_text(None, Some("无代码")))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_shanghai_rejects_numeric_code_and_missing_name() {
        let numeric = sz_row(Some(CodeCell::Integer(600000)), Some("浦发银行"));
        assert!(normalize_row(Segment::ShanghaiMain, &numeric).is_err());

        let nameless = ListingRow::from_text(Some("600000"), None);
        assert!(normalize_row(Segment::ShanghaiMain, &nameless).is_err());
    }

    #[test]
    fn test_shenzhen_rule() {
        println!("\n========== 测试深市代码归一化 ==========");
        let cases = vec![
            (sz_row(Some(CodeCell::Integer(1)), Some("平安银行")), Some("000001.SZ")),
            (sz_row(Some(CodeCell::Float(2.0)), Some("万科A")), Some("000002.SZ")),
            (sz_row(Some(CodeCell::Text("300750".into())), Some("宁德时代")), Some("300750.SZ")),
            (sz_row(Some(CodeCell::Integer(999999)), Some("测试")), None),
            (sz_row(None, Some("无代码")), None),
            (sz_row(Some(CodeCell::Integer(1)), None), None),
        ];

        for (input, expected) in &cases {
            let result = normalize_row(Segment::Shenzhen, input).unwrap();
            let key = result.map(|(symbol, _)| symbol.to_string());
            println!("  {:?} -> {:?} (期望: {:?})", input.code, key, expected);
            assert_eq!(key.as_deref(), *expected);
        }
        println!("✅ 深市代码归一化测试通过！");
    }

    #[test]
    fn test_zero_pad_code() {
        assert_eq!(zero_pad_code(&CodeCell::Integer(1)).unwrap(), "000001");
        assert_eq!(zero_pad_code(&CodeCell::Float(2.9)).unwrap(), "000002");
        assert_eq!(zero_pad_code(&CodeCell::Text(" 000651 ".into())).unwrap(), "000651");
        assert_eq!(zero_pad_code(&CodeCell::Integer(301236)).unwrap(), "301236");
        assert!(zero_pad_code(&CodeCell::Text("ABC".into())).is_err());
        assert!(zero_pad_code(&CodeCell::Text("1.5".into())).is_err());
        assert!(zero_pad_code(&CodeCell::Float(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_star_market_rule() {
        let kept = normalize_row(Segment::StarMarket, &row("688981", "中芯国际")).unwrap();
        assert_eq!(kept.unwrap().0.to_string(), "688981.SS");

        let dropped = normalize_row(Segment::StarMarket, &row("689009", "九号公司")).unwrap();
        assert!(dropped.is_none());
    }

    #[test]
    fn test_beijing_rule() {
        let kept = normalize_row(Segment::Beijing, &row("920002", "万达轴承")).unwrap();
        assert_eq!(kept.unwrap().0.to_string(), "920002.BJ");

        let missing = ListingRow::from_text(None, Some("无代码"));
        assert!(normalize_row(Segment::Beijing, &missing).is_err());
    }

    // ==================== 聚合流程 ====================

    #[tokio::test]
    async fn test_produce_symbol_map_all_segments() {
        println!("\n========== 测试四个板块聚合 ==========");
        let aggregator = SymbolAggregator::new(Box::new(full_source()), DuplicatePolicy::Overwrite);
        let report = aggregator.produce_symbol_map().await;

        let keys: Vec<String> = report.symbols.iter().map(|(k, _)| k.to_string()).collect();
        println!("  {:?}", keys);

        assert!(report.is_complete());
        assert!(report.warnings.is_empty());
        assert_eq!(
            keys,
            vec![
                "600519.SS", "601398.SS", "000001.SZ", "300750.SZ", "688981.SS", "430047.BJ",
                "830799.BJ",
            ]
        );
        println!("✅ 聚合测试通过！");
    }

    /// 失败板块之前的结果保留，之后的板块不再请求
    #[tokio::test]
    async fn test_failure_keeps_completed_segments() {
        let source = full_source().fail(Segment::StarMarket, "connection reset");
        let aggregator = SymbolAggregator::new(Box::new(source), DuplicatePolicy::Overwrite);
        let report = aggregator.produce_symbol_map().await;

        assert!(!report.is_complete());
        assert_eq!(report.completed, vec![Segment::ShanghaiMain, Segment::Shenzhen]);
        assert_eq!(report.symbols.len(), 4);
        assert!(report.symbols.iter().all(|(k, _)| !k.code.starts_with("688")));

        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.segment, Some(Segment::StarMarket));
        assert_eq!(failure.to_string(), "科创板: connection reset");
    }

    /// 板块内部转换失败时，该板块的部分结果不写入
    #[tokio::test]
    async fn test_conversion_failure_discards_whole_segment() {
        let source = full_source().ok(
            Segment::Shenzhen,
            vec![
                sz_row(Some(CodeCell::Integer(1)), Some("平安银行")),
                sz_row(Some(CodeCell::Text("N/A".into())), Some("异常")),
            ],
        );
        let aggregator = SymbolAggregator::new(Box::new(source), DuplicatePolicy::Overwrite);
        let report = aggregator.produce_symbol_map().await;

        assert_eq!(report.completed, vec![Segment::ShanghaiMain]);
        assert_eq!(report.symbols.len(), 2);
        assert_eq!(report.failure.as_ref().unwrap().segment, Some(Segment::Shenzhen));
    }

    #[tokio::test]
    async fn test_all_segments_fail() {
        let source = MockSource::new()
            .fail(Segment::ShanghaiMain, "dns error")
            .fail(Segment::Shenzhen, "dns error")
            .fail(Segment::StarMarket, "dns error")
            .fail(Segment::Beijing, "dns error");
        let aggregator = SymbolAggregator::new(Box::new(source), DuplicatePolicy::Overwrite);
        let report = aggregator.produce_symbol_map().await;

        assert!(report.symbols.is_empty());
        assert!(report.completed.is_empty());
        assert_eq!(serde_json::to_string(&report.symbols).unwrap(), "{}");
        assert_eq!(report.failure.unwrap().segment, Some(Segment::ShanghaiMain));
    }

    #[tokio::test]
    async fn test_segments_requested_in_order_and_stop_after_failure() {
        let source = full_source();
        let calls = Arc::clone(&source.calls);
        let aggregator = SymbolAggregator::new(Box::new(source), DuplicatePolicy::Overwrite);
        aggregator.produce_symbol_map().await;
        assert_eq!(*calls.lock().unwrap(), Segment::ALL.to_vec());

        let source = full_source().fail(Segment::Shenzhen, "timeout");
        let calls = Arc::clone(&source.calls);
        let aggregator = SymbolAggregator::new(Box::new(source), DuplicatePolicy::Overwrite);
        aggregator.produce_symbol_map().await;
        assert_eq!(
            *calls.lock().unwrap(),
            vec![Segment::ShanghaiMain, Segment::Shenzhen]
        );
    }

    #[tokio::test]
    async fn test_duplicate_overwrite_warns() {
        let source = full_source().ok(Segment::StarMarket, vec![row("688981", "中芯国际")]).ok(
            Segment::ShanghaiMain,
            vec![row("600519", "贵州茅台"), row("600519", "茅台")],
        );
        let aggregator = SymbolAggregator::new(Box::new(source), DuplicatePolicy::Overwrite);
        let report = aggregator.produce_symbol_map().await;

        assert!(report.is_complete());
        assert_eq!(report.warnings.len(), 1);
        let key: TickerSymbol = "600519.SS".parse().unwrap();
        assert_eq!(report.symbols.get(&key), Some("茅台"));
    }

    #[tokio::test]
    async fn test_duplicate_reject_fails_segment() {
        let source = full_source().ok(
            Segment::StarMarket,
            vec![row("688981", "中芯国际"), row("688981", "中芯国际U")],
        );
        let aggregator = SymbolAggregator::new(Box::new(source), DuplicatePolicy::Reject);
        let report = aggregator.produce_symbol_map().await;

        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.segment, Some(Segment::StarMarket));
        assert!(failure.to_string().contains("688981.SS"));
        assert_eq!(report.completed, vec![Segment::ShanghaiMain, Segment::Shenzhen]);
        assert_eq!(report.symbols.len(), 4);
    }
}
