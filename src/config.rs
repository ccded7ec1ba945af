//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// 指定配置文件路径的环境变量
pub const CONFIG_ENV: &str = "SYMBOL_MAP_CONFIG";

/// HTTP 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// 数据源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// 上交所、深交所、北交所官方接口
    Exchange,
    /// 东方财富行情列表接口
    Eastmoney,
}

/// 数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
}

/// 重复代码处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// 后写覆盖先写，记录警告
    Overwrite,
    /// 视为该板块失败
    Reject,
}

/// 聚合配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateConfig {
    #[serde(default = "default_duplicate_policy")]
    pub duplicate_policy: DuplicatePolicy,
    /// 部分板块失败时以非零状态码退出
    #[serde(default)]
    pub fail_on_error: bool,
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// 单行 JSON 对象
    Json,
    /// 每行 `代码,交易所`
    CodeList,
    /// TypeScript 常量模块
    Typescript,
}

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_format")]
    pub format: OutputFormat,
    /// 输出文件路径（为空则写到标准输出）
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub aggregate: AggregateConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// 配置来源
///
/// 加载配置时日志系统尚未初始化，由调用方在初始化后记录
#[derive(Debug)]
pub enum ConfigOrigin {
    File(PathBuf),
    Default,
    Invalid { path: PathBuf, error: String },
}

// 默认值函数
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}
fn default_provider() -> ProviderKind { ProviderKind::Exchange }
fn default_duplicate_policy() -> DuplicatePolicy { DuplicatePolicy::Overwrite }
fn default_output_format() -> OutputFormat { OutputFormat::Json }
fn default_log_level() -> String { "warn".to_string() }

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
        }
    }
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: default_duplicate_policy(),
            fail_on_error: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
            path: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从环境变量指定的文件，其次默认路径，失败则使用默认值
    pub fn load() -> (Self, ConfigOrigin) {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Ok(path) = env::var(CONFIG_ENV) {
            candidates.push(PathBuf::from(path));
        }
        candidates.push(PathBuf::from("config.json"));
        candidates.push(PathBuf::from("config/config.json"));

        Self::load_from(&candidates)
    }

    /// 依次尝试候选路径，第一个存在的文件决定结果
    pub fn load_from(candidates: &[PathBuf]) -> (Self, ConfigOrigin) {
        for path in candidates {
            if path.exists() {
                return match Self::from_file(path) {
                    Ok(config) => (config, ConfigOrigin::File(path.clone())),
                    Err(e) => (
                        Self::default(),
                        ConfigOrigin::Invalid {
                            path: path.clone(),
                            error: e.to_string(),
                        },
                    ),
                };
            }
        }

        (Self::default(), ConfigOrigin::Default)
    }
}
