//! # scan 子命令 CLI 定义
//!
//! 红移来源三选一：`--redshifts` 列表、`--range` + `--step`、`--spectra-dir`。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/scan.rs`

use super::common::{CosmologyArgs, FigureArgs, HmfArgs, OutputFormat};
use clap::Args;
use std::path::PathBuf;

/// scan 子命令参数
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Comma-separated redshifts (e.g., "0,0.5,1")
    #[arg(long, conflicts_with_all = ["range", "spectra_dir"])]
    pub redshifts: Option<String>,

    /// Redshift range (e.g., "0-2"), sampled with --step
    #[arg(long, conflicts_with = "spectra_dir")]
    pub range: Option<String>,

    /// Redshift step for --range
    #[arg(long, default_value_t = 0.25)]
    pub step: f64,

    /// Directory of per-redshift spectrum files; z is parsed from each file name
    #[arg(long)]
    pub spectra_dir: Option<PathBuf>,

    /// Glob pattern for spectrum files (comma-separated for several)
    #[arg(long, default_value = "*.csv,*.dat,*.txt")]
    pub pattern: String,

    /// Recurse into subdirectories of --spectra-dir
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    #[command(flatten)]
    pub cosmology: CosmologyArgs,

    #[command(flatten)]
    pub hmf: HmfArgs,

    /// Output directory (one file per redshift)
    #[arg(short, long, default_value = "hmf_scan")]
    pub output: PathBuf,

    /// Per-redshift output format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Additional figure overlaying all redshifts (.png or .svg)
    #[arg(long)]
    pub plot: Option<PathBuf>,

    #[command(flatten)]
    pub figure: FigureArgs,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
