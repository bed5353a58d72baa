//! # 统一错误处理模块
//!
//! 定义 halomass 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - `ConfigurationError`: 不支持的拟合函数族 / 质量定义，宇宙学参数缺失
//! - `DomainError`: 数值定义域错误（Δ ≤ 75、σ = 0、ρ_m ≤ 0、非正质量等）
//! - `ShapeError`: 数组长度不匹配
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// halomass 统一错误类型
#[derive(Error, Debug)]
pub enum HmfError {
    // ─────────────────────────────────────────────────────────────
    // 数值计算错误
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("Shape error: {0}")]
    ShapeError(String),

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range format: {0}")]
    InvalidRange(String),

    // ─────────────────────────────────────────────────────────────
    // CSV / 绘图错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Plot rendering failed: {0}")]
    PlotError(String),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, HmfError>;

impl HmfError {
    /// 构造 ConfigurationError
    pub fn config(msg: impl Into<String>) -> Self {
        HmfError::ConfigurationError(msg.into())
    }

    /// 构造 DomainError
    pub fn domain(msg: impl Into<String>) -> Self {
        HmfError::DomainError(msg.into())
    }

    /// 构造 ShapeError
    pub fn shape(msg: impl Into<String>) -> Self {
        HmfError::ShapeError(msg.into())
    }
}
