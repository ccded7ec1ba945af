//! 业务逻辑服务模块
//!
//! 封装数据获取、聚合和输出逻辑

pub mod aggregator; // 板块聚合
pub mod export;     // 结果输出
pub mod listing;    // 上市列表数据源
