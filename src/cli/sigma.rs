//! # sigma 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/sigma.rs`

use super::common::{CosmologyArgs, FigureArgs, OutputFormat};
use clap::Args;
use std::path::PathBuf;

/// sigma 子命令参数
#[derive(Args, Debug)]
pub struct SigmaArgs {
    /// Redshift
    #[arg(short = 'z', long, default_value_t = 0.0)]
    pub redshift: f64,

    #[command(flatten)]
    pub cosmology: CosmologyArgs,

    /// Also compute dsigma/dR (analytical or numerical)
    #[arg(long)]
    pub derivative: Option<String>,

    /// Print sigma at these radii in Mpc (comma-separated) instead of the internal grid
    #[arg(long)]
    pub radii: Option<String>,

    /// Output file (.csv, .png or .svg)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(flatten)]
    pub figure: FigureArgs,

    /// Number of rows shown in the terminal table
    #[arg(long, default_value_t = 12)]
    pub rows: usize,
}
