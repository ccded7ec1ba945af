//! 聚合结果模型

use std::fmt;

use super::{Segment, SymbolMap};

/// 中止聚合的错误
#[derive(Debug)]
pub struct SegmentFailure {
    /// 失败的板块，数据源初始化失败时为 None
    pub segment: Option<Segment>,
    /// 错误链
    pub error: anyhow::Error,
}

impl fmt::Display for SegmentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.segment {
            Some(segment) => write!(f, "{}: {:#}", segment, self.error),
            None => write!(f, "{:#}", self.error),
        }
    }
}

/// 聚合报告
///
/// 包含：
/// - symbols: 已完成板块累积的映射表（可能为空）
/// - completed: 已完成的板块
/// - failure: 中止聚合的错误
/// - warnings: 非致命警告（如重复代码被覆盖）
#[derive(Debug, Default)]
pub struct AggregateReport {
    pub symbols: SymbolMap,
    pub completed: Vec<Segment>,
    pub failure: Option<SegmentFailure>,
    pub warnings: Vec<String>,
}

impl AggregateReport {
    /// 还没请求任何板块就失败（如 HTTP 客户端创建失败），映射表为空
    pub fn aborted(error: anyhow::Error) -> Self {
        Self {
            failure: Some(SegmentFailure {
                segment: None,
                error,
            }),
            ..Self::default()
        }
    }

    /// 四个板块是否全部成功
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.completed.len() == Segment::ALL.len()
    }

    /// 写到标准错误的诊断行，成功时为 None
    pub fn diagnostic(&self) -> Option<String> {
        self.failure
            .as_ref()
            .map(|failure| format!("Error: {}", failure))
    }
}
