//! # eval 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/eval.rs`

use super::common::{CosmologyArgs, FigureArgs, HmfArgs, OutputFormat};
use clap::Args;
use std::path::PathBuf;

/// eval 子命令参数
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Redshift
    #[arg(short = 'z', long, default_value_t = 0.0)]
    pub redshift: f64,

    #[command(flatten)]
    pub cosmology: CosmologyArgs,

    #[command(flatten)]
    pub hmf: HmfArgs,

    /// Output file (.csv, .png or .svg)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(flatten)]
    pub figure: FigureArgs,

    /// Number of rows shown in the terminal table
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}
