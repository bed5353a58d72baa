//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `utils/` 与 halomass 库
//! - 子模块: common, eval, scan, sigma

pub mod common;
pub mod eval;
pub mod scan;
pub mod sigma;

use crate::cli::Commands;
use halomass::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Eval(args) => eval::execute(args),
        Commands::Scan(args) => scan::execute(args),
        Commands::Sigma(args) => sigma::execute(args),
    }
}
