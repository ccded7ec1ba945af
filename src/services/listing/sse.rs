//! 上交所股票列表
//!
//! 对应 akshare 的 stock_info_sh_name_code()，主板A股和科创板共用同一查询接口

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::common::{ensure_success, SSE_REFERER, SSE_SQL_ID};
use crate::models::{ListingRow, Segment};

/// 上交所查询响应
#[derive(Debug, Deserialize)]
struct SseQueryResponse {
    result: Vec<SseListing>,
}

#[derive(Debug, Deserialize)]
struct SseListing {
    #[serde(rename = "A_STOCK_CODE", default)]
    code: Option<String>,
    #[serde(rename = "COMPANY_ABBR", default)]
    company_abbr: Option<String>,
    #[serde(rename = "SEC_NAME_CN", default)]
    sec_name_cn: Option<String>,
}

impl SseListing {
    /// 优先使用公司简称，缺失时退回证券简称
    fn name(&self) -> Option<&str> {
        self.company_abbr
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.sec_name_cn.as_deref())
    }
}

/// 板块对应的 STOCK_TYPE 参数
fn stock_type(segment: Segment) -> Result<&'static str> {
    match segment {
        Segment::ShanghaiMain => Ok("1"),
        Segment::StarMarket => Ok("8"),
        other => Err(anyhow!("上交所接口不提供{}列表", other)),
    }
}

/// 获取上交所股票列表
pub async fn fetch_sse_listings(
    client: &Client,
    base_url: &str,
    segment: Segment,
) -> Result<Vec<ListingRow>> {
    let stock_type = stock_type(segment)?;
    let url = Url::parse_with_params(
        base_url,
        &[
            ("STOCK_TYPE", stock_type),
            ("REG_PROVINCE", ""),
            ("CSRC_CODE", ""),
            ("STOCK_CODE", ""),
            ("sqlId", SSE_SQL_ID),
            ("COMPANY_STATUS", "2,4,5,7,8"),
            ("type", "inParams"),
            ("isPagination", "true"),
            ("pageHelp.cacheSize", "1"),
            ("pageHelp.beginPage", "1"),
            ("pageHelp.pageSize", "10000"),
            ("pageHelp.pageNo", "1"),
            ("pageHelp.endPage", "1"),
        ],
    )?;

    log::debug!("请求{}列表 URL: {}", segment, url);

    let response = client
        .get(url)
        .header("Referer", SSE_REFERER)
        .send()
        .await
        .with_context(|| format!("请求{}列表失败", segment))?;
    let response = ensure_success(response, segment)?;

    let data: SseQueryResponse = response
        .json()
        .await
        .map_err(|e| anyhow!("解析上交所响应失败: {}", e))?;

    Ok(sse_rows(&data))
}

/// 上交所查询结果转换为列表行
fn sse_rows(data: &SseQueryResponse) -> Vec<ListingRow> {
    data.result
        .iter()
        .map(|item| ListingRow::from_text(item.code.as_deref(), item.name()))
        .collect()
}
