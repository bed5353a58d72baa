//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `eval`: 单红移质量函数
//! - `scan`: 多红移扫描
//! - `sigma`: σ(R) 表
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: common, eval, scan, sigma

pub mod common;
pub mod eval;
pub mod scan;
pub mod sigma;

use clap::{Parser, Subcommand};

/// halomass - 晕质量函数工具
#[derive(Parser)]
#[command(name = "halomass")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Halo mass function toolkit (top-hat variance + Tinker08)", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate the halo mass function at one redshift
    Eval(eval::EvalArgs),

    /// Evaluate the halo mass function over many redshifts in parallel
    Scan(scan::ScanArgs),

    /// Tabulate the smoothed density variance sigma(R)
    Sigma(sigma::SigmaArgs),
}
