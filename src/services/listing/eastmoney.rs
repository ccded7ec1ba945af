//! 东方财富行情列表
//!
//! push2.eastmoney.com 的 clist 接口，按 fs 参数筛选板块，只取 f12(代码) 和 f14(名称)

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::common::{decode_body, ensure_success, strip_jsonp};
use crate::models::{ListingRow, Segment};

/// 每页条数（接口单页上限为 100）
const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct ClistResponse {
    rc: i64,
    data: Option<ClistData>,
}

#[derive(Debug, Deserialize)]
struct ClistData {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    diff: Vec<ClistItem>,
}

#[derive(Debug, Deserialize)]
struct ClistItem {
    #[serde(default)]
    f12: Option<String>,
    #[serde(default)]
    f14: Option<String>,
}

/// 板块对应的 fs 筛选参数
fn market_filter(segment: Segment) -> &'static str {
    match segment {
        Segment::ShanghaiMain => "m:1 t:2",
        Segment::StarMarket => "m:1 t:23",
        Segment::Shenzhen => "m:0 t:6,m:0 t:80",
        Segment::Beijing => "m:0 t:81 s:2048",
    }
}

/// 获取东方财富板块列表，逐页请求直到取满 total 条
pub async fn fetch_eastmoney_listings(
    client: &Client,
    base_url: &str,
    segment: Segment,
) -> Result<Vec<ListingRow>> {
    let mut rows = Vec::new();
    let mut page = 1usize;

    loop {
        let data = match fetch_clist_page(client, base_url, segment, page).await? {
            Some(data) => data,
            None => break,
        };

        let fetched = data.diff.len();
        rows.extend(
            data.diff
                .iter()
                .map(|item| ListingRow::from_text(item.f12.as_deref(), item.f14.as_deref())),
        );

        if fetched == 0 || rows.len() >= data.total {
            break;
        }
        page += 1;
    }

    Ok(rows)
}

async fn fetch_clist_page(
    client: &Client,
    base_url: &str,
    segment: Segment,
    page: usize,
) -> Result<Option<ClistData>> {
    let page_str = page.to_string();
    let size_str = PAGE_SIZE.to_string();
    let url = Url::parse_with_params(
        base_url,
        &[
            ("pn", page_str.as_str()),
            ("pz", size_str.as_str()),
            ("po", "1"),
            ("np", "1"),
            ("fltt", "2"),
            ("invt", "2"),
            ("fid", "f12"),
            ("fs", market_filter(segment)),
            ("fields", "f12,f14"),
        ],
    )?;

    log::debug!("请求{}列表 URL: {}", segment, url);

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("请求{}列表第 {} 页失败", segment, page))?;
    let response = ensure_success(response, segment)?;

    let bytes = response.bytes().await?;
    parse_clist_page(&decode_body(&bytes))
}

/// 解析单页响应，data 为 null 表示没有更多数据
fn parse_clist_page(text: &str) -> Result<Option<ClistData>> {
    let response: ClistResponse = serde_json::from_str(strip_jsonp(text))
        .map_err(|e| anyhow!("解析东方财富响应失败: {}", e))?;

    if response.rc != 0 {
        return Err(anyhow!("东方财富接口返回错误: rc={}", response.rc));
    }

    Ok(response.data)
}
