//! 北交所股票列表
//!
//! 对应 akshare 的 stock_info_bj_name_code()
//! 接口按页返回，响应格式: null([{"content":[...],"totalPages":N,...}])

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;

use super::common::{decode_body, ensure_success, strip_jsonp};
use crate::models::{ListingRow, Segment};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BsePage {
    #[serde(default)]
    content: Vec<BseListing>,
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct BseListing {
    /// 证券代码
    #[serde(default)]
    xxzqdm: Option<String>,
    /// 证券简称
    #[serde(default)]
    xxzqjc: Option<String>,
}

/// 获取北交所全部股票列表
pub async fn fetch_bse_listings(
    client: &Client,
    base_url: &str,
    segment: Segment,
) -> Result<Vec<ListingRow>> {
    if segment != Segment::Beijing {
        return Err(anyhow!("北交所接口不提供{}列表", segment));
    }

    let first = fetch_bse_page(client, base_url, 0).await?;
    let total_pages = first.total_pages;
    log::debug!("{}共 {} 页", segment, total_pages);

    let mut rows = page_rows(&first);
    for page in 1..total_pages {
        let next = fetch_bse_page(client, base_url, page).await?;
        rows.extend(page_rows(&next));
    }

    Ok(rows)
}

async fn fetch_bse_page(client: &Client, base_url: &str, page: u32) -> Result<BsePage> {
    let page_str = page.to_string();
    let form = [
        ("page", page_str.as_str()),
        ("typejb", "T"),
        ("xxfcbj[]", "2"),
        ("xxzqdm", ""),
        ("sortfield", "xxzqdm"),
        ("sorttype", "asc"),
    ];

    log::debug!("请求北交所列表第 {} 页 URL: {}", page, base_url);

    let response = client
        .post(base_url)
        .form(&form)
        .send()
        .await
        .with_context(|| format!("请求北交所列表第 {} 页失败", page))?;
    let response = ensure_success(response, Segment::Beijing)?;

    let bytes = response.bytes().await?;
    parse_bse_page(&decode_body(&bytes))
}

/// 解析北交所单页响应
fn parse_bse_page(text: &str) -> Result<BsePage> {
    let pages: Vec<BsePage> = serde_json::from_str(strip_jsonp(text))
        .map_err(|e| anyhow!("解析北交所响应失败: {}", e))?;

    pages
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("北交所响应为空"))
}

fn page_rows(page: &BsePage) -> Vec<ListingRow> {
    page.content
        .iter()
        .map(|item| ListingRow::from_text(item.xxzqdm.as_deref(), item.xxzqjc.as_deref()))
        .collect()
}
