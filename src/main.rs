//! A股股票代码映射表生成工具
//!
//! 获取沪市主板、深市主板/创业板、科创板、北交所的上市股票列表，
//! 输出 `代码.后缀 -> 简称` 的映射表
//! 数据来源：上交所、深交所、北交所官方接口或东方财富

mod config;   // 配置
mod models;   // 数据模型定义
mod services; // 业务逻辑服务

use env_logger::Env;
use std::process::ExitCode;

use crate::config::{AppConfig, ConfigOrigin};
use crate::models::AggregateReport;
use crate::services::aggregator::SymbolAggregator;
use crate::services::{export, listing};

/// 程序入口
///
/// 标准输出只写映射表；失败信息以 `Error: ...` 写到标准错误
#[tokio::main]
async fn main() -> ExitCode {
    let (config, origin) = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先于配置文件
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));

    match &origin {
        ConfigOrigin::File(path) => log::info!("从 {} 加载配置成功", path.display()),
        ConfigOrigin::Invalid { path, error } => {
            log::warn!("加载配置文件 {} 失败: {}，使用默认配置", path.display(), error)
        }
        ConfigOrigin::Default => log::info!("使用默认配置"),
    }

    let report = build_report(&config).await;

    if report.is_complete() {
        log::info!("全部板块获取成功");
    } else if report.symbols.is_empty() {
        log::info!("未能获取到股票数据");
    }

    let output = export::render(&report.symbols, config.output.format)
        .and_then(|text| export::write_output(&text, config.output.path.as_deref()));

    if let Some(line) = report.diagnostic() {
        eprintln!("{}", line);
    }

    if let Err(e) = output {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    if report.failure.is_some() && config.aggregate.fail_on_error {
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// 按配置创建数据源并聚合
///
/// 数据源创建失败同样归入报告，仍然输出空映射表
async fn build_report(config: &AppConfig) -> AggregateReport {
    match listing::build_source(config.source.provider, &config.http) {
        Ok(source) => {
            SymbolAggregator::new(source, config.aggregate.duplicate_policy)
                .produce_symbol_map()
                .await
        }
        Err(e) => {
            log::debug!("创建数据源失败: {:#}", e);
            AggregateReport::aborted(e)
        }
    }
}
