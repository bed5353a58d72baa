//! # 文件收集器
//!
//! 根据目录和 glob 模式收集功率谱文件，并从文件名解析红移。
//!
//! ## 功能
//! - glob 模式匹配（逗号分隔多模式）
//! - 递归目录搜索
//! - 文件名红移解析，如 `pk_z0.5.csv`、`linear_z=1.25.dat`
//!
//! ## 依赖关系
//! - 被 `commands/scan.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配，`regex` 解析

use halomass::error::{HmfError, Result};

use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件名中红移的匹配模式
pub const REDSHIFT_PATTERN: &str = r"z[=_-]?([0-9]+(?:\.[0-9]+)?)";

/// 文件收集器
pub struct FileCollector {
    /// 输入目录
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<glob::Pattern>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: Vec::new(),
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                glob::Pattern::new(s).map_err(|e| {
                    HmfError::InvalidArgument(format!("Invalid pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件（按路径排序）
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if !self.input.is_dir() {
            return Err(HmfError::DirectoryNotFound {
                path: self.input.display().to_string(),
            });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        Ok(files)
    }

    /// 检查文件是否匹配任一模式，未设置模式时全部匹配
    fn matches_patterns(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(filename))
    }
}

/// 编译红移匹配模式
pub fn redshift_regex() -> Result<Regex> {
    Regex::new(REDSHIFT_PATTERN)
        .map_err(|e| HmfError::InvalidArgument(format!("bad redshift pattern: {}", e)))
}

/// 从文件名（不含扩展名）解析红移，取最后一个匹配
pub fn redshift_from_filename(re: &Regex, path: &Path) -> Option<f64> {
    let stem = path.file_stem()?.to_str()?;
    re.captures_iter(stem)
        .last()
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
