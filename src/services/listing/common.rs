//! 公共常量和辅助函数

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use chrono_tz::Asia::Shanghai;
use regex::Regex;
use reqwest::{Client, Response};
use std::sync::OnceLock;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::models::Segment;

// ==================== 交易所官方接口 ====================

/// 上交所股票列表查询 API
pub const SSE_QUERY_URL: &str = "https://query.sse.com.cn/sseQuery/commonQuery.do";
/// 上交所股票列表页面（作为 Referer）
pub const SSE_REFERER: &str = "https://www.sse.com.cn/assortment/stock/list/share/";
/// 上交所股票列表 sqlId
pub const SSE_SQL_ID: &str = "COMMON_SSE_CP_GPJCTPZ_GPLB_GP_L";
/// 深交所报表下载 API
pub const SZSE_REPORT_URL: &str = "https://www.szse.cn/api/report/ShowReport";
/// 北交所证券列表 API
pub const BSE_LIST_URL: &str = "https://www.bse.cn/nqxxController/nqxxCnzq.do";

// ==================== 东方财富 ====================

/// 东方财富行情列表 API
pub const EASTMONEY_CLIST_URL: &str = "https://push2.eastmoney.com/api/qt/clist/get";

/// 各数据源接口地址
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub sse_query: String,
    pub szse_report: String,
    pub bse_list: String,
    pub eastmoney_clist: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            sse_query: SSE_QUERY_URL.to_string(),
            szse_report: SZSE_REPORT_URL.to_string(),
            bse_list: BSE_LIST_URL.to_string(),
            eastmoney_clist: EASTMONEY_CLIST_URL.to_string(),
        }
    }
}

/// 获取北京时间字符串（ISO 8601 格式，带+08:00时区）
pub fn get_beijing_time() -> String {
    Utc::now().with_timezone(&Shanghai).to_rfc3339()
}

/// 按配置创建 HTTP 客户端
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .user_agent(config.user_agent.as_str())
        .gzip(true)
        .cookie_store(true)
        .build()
        .context("创建HTTP客户端失败")?;
    Ok(client)
}

/// 检查响应状态码
pub fn ensure_success(response: Response, segment: Segment) -> Result<Response> {
    if !response.status().is_success() {
        return Err(anyhow!("获取{}列表失败: {}", segment, response.status()));
    }
    Ok(response)
}

/// 解码响应正文，非 UTF-8 时按 GBK 解码
pub fn decode_body(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => encoding_rs::GBK.decode(bytes).0.to_string(),
    }
}

fn jsonp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\s*[A-Za-z_$][\w$.]*\s*\((.*)\)\s*;?\s*$").expect("valid jsonp regex")
    })
}

/// 去掉 JSONP 包装，如 `null([...])` -> `[...]`
///
/// 非 JSONP 文本原样返回
pub fn strip_jsonp(text: &str) -> &str {
    match jsonp_regex().captures(text).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => text.trim(),
    }
}
