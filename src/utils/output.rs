//! # 终端输出
//!
//! 状态行统一为 `[TAG] 消息`，标签按状态着色；
//! 另有键值行、文件写出行与标题栏。
//!
//! ## 依赖关系
//! - 被 `main.rs` 与所有 `commands/` 模块使用
//! - 使用 `colored` crate

use colored::{ColoredString, Colorize};
use std::path::Path;

/// 标题栏与分隔线宽度
const RULE_WIDTH: usize = 60;

/// 状态行种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Error,
    Warning,
    Info,
    Skip,
}

impl Status {
    fn tag(self) -> ColoredString {
        match self {
            Status::Ok => "[OK]".green().bold(),
            Status::Error => "[ERR]".red().bold(),
            Status::Warning => "[WARN]".yellow().bold(),
            Status::Info => "[*]".blue().bold(),
            Status::Skip => "[SKIP]".dimmed(),
        }
    }
}

fn status_line(status: Status, msg: &str) -> String {
    format!("{} {}", status.tag(), msg)
}

fn rule() -> ColoredString {
    "─".repeat(RULE_WIDTH).dimmed()
}

pub fn print_success(msg: &str) {
    println!("{}", status_line(Status::Ok, msg));
}

/// 错误写到 stderr
pub fn print_error(msg: &str) {
    eprintln!("{}", status_line(Status::Error, msg));
}

pub fn print_warning(msg: &str) {
    println!("{}", status_line(Status::Warning, msg));
}

pub fn print_info(msg: &str) {
    println!("{}", status_line(Status::Info, msg));
}

pub fn print_skip(msg: &str) {
    println!("{}", status_line(Status::Skip, msg));
}

/// 缩进的键值行，键左对齐
pub fn print_kv(key: &str, value: &str) {
    println!("    {:<22} {}", key.dimmed(), value);
}

/// `[OK] <what> -> <path>`
pub fn print_saved(what: &str, path: &Path) {
    let msg = format!("{} {} {}", what, "->".cyan(), path.display());
    println!("{}", status_line(Status::Ok, &msg));
}

pub fn print_header(title: &str) {
    println!("\n{}", rule());
    println!("  {}", title.bold());
    println!("{}\n", rule());
}

pub fn print_separator() {
    println!("{}", rule());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_layout() {
        colored::control::set_override(false);
        assert_eq!(status_line(Status::Ok, "done"), "[OK] done");
        assert_eq!(status_line(Status::Error, "z = 1: bad"), "[ERR] z = 1: bad");
        assert_eq!(status_line(Status::Skip, ""), "[SKIP] ");
        assert_eq!(rule().to_string().chars().count(), RULE_WIDTH);
    }
}
