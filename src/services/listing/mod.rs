//! 上市列表数据源
//!
//! 负责获取各板块的 (代码, 简称) 行，并在边界处转换为 [`ListingRow`]
//!
//! ## 数据来源
//! - 交易所官方接口：上交所（主板A股、科创板）、深交所（A股列表 xlsx）、北交所
//! - 东方财富：clist 行情列表接口

mod bse;
mod common;
mod eastmoney;
mod sse;
mod szse;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use crate::config::{HttpConfig, ProviderKind};
use crate::models::{ListingRow, Segment};

pub use common::{build_client, get_beijing_time, Endpoints};

/// 上市列表数据源
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// 数据源名称
    fn name(&self) -> &'static str;

    /// 获取某个板块的全部上市行
    async fn fetch_listings(&self, segment: Segment) -> Result<Vec<ListingRow>>;
}

/// 交易所官方接口数据源（与 akshare stock_info_*_name_code 相同）
pub struct ExchangeSource {
    client: Client,
    endpoints: Endpoints,
}

impl ExchangeSource {
    pub fn new(client: Client) -> Self {
        Self::with_endpoints(client, Endpoints::default())
    }

    pub fn with_endpoints(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }
}

#[async_trait]
impl ListingSource for ExchangeSource {
    fn name(&self) -> &'static str {
        "exchange"
    }

    async fn fetch_listings(&self, segment: Segment) -> Result<Vec<ListingRow>> {
        match segment {
            Segment::ShanghaiMain | Segment::StarMarket => {
                sse::fetch_sse_listings(&self.client, &self.endpoints.sse_query, segment).await
            }
            Segment::Shenzhen => {
                szse::fetch_szse_listings(&self.client, &self.endpoints.szse_report, segment).await
            }
            Segment::Beijing => {
                bse::fetch_bse_listings(&self.client, &self.endpoints.bse_list, segment).await
            }
        }
    }
}

/// 东方财富数据源
pub struct EastmoneySource {
    client: Client,
    endpoints: Endpoints,
}

impl EastmoneySource {
    pub fn new(client: Client) -> Self {
        Self::with_endpoints(client, Endpoints::default())
    }

    pub fn with_endpoints(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }
}

#[async_trait]
impl ListingSource for EastmoneySource {
    fn name(&self) -> &'static str {
        "eastmoney"
    }

    async fn fetch_listings(&self, segment: Segment) -> Result<Vec<ListingRow>> {
        eastmoney::fetch_eastmoney_listings(&self.client, &self.endpoints.eastmoney_clist, segment)
            .await
    }
}

/// 按配置创建数据源
pub fn build_source(provider: ProviderKind, http: &HttpConfig) -> Result<Box<dyn ListingSource>> {
    let client = build_client(http)?;
    let source: Box<dyn ListingSource> = match provider {
        ProviderKind::Exchange => Box::new(ExchangeSource::new(client)),
        ProviderKind::Eastmoney => Box::new(EastmoneySource::new(client)),
    };
    Ok(source)
}
