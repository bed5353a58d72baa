//! # halomass - 晕质量函数命令行工具
//!
//! 将质量函数流水线封装为单一可执行文件。
//!
//! ## 子命令
//! - `eval`  - 单个红移的质量函数
//! - `scan`  - 多红移并行扫描（红移列表 / 范围 / 功率谱目录）
//! - `sigma` - σ(R) 表
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     └── halomass (库: cosmology / hmf / numeric)
//!   ├── batch/      (并行批处理)
//!   └── utils/      (工具函数)
//! ```
//!
//! 日志由 `RUST_LOG` 控制，例如 `RUST_LOG=halomass=debug`。

mod batch;
mod cli;
mod commands;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
