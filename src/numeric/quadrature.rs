//! # 数值积分
//!
//! 复合 Simpson 积分，用于共动距离与线性增长因子。
//!
//! ## 依赖关系
//! - 被 `cosmology/background.rs` 调用

/// 复合 Simpson 积分 ∫_a^b f(x) dx
///
/// `intervals` 会被向上取为偶数，至少为 2。
pub fn simpson<F>(f: F, a: f64, b: f64, intervals: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    if a == b {
        return 0.0;
    }

    let n = intervals.max(2);
    let n = if n % 2 == 1 { n + 1 } else { n };
    let h = (b - a) / n as f64;

    let mut sum = f(a) + f(b);
    for i in 1..n {
        let x = a + i as f64 * h;
        sum += if i % 2 == 1 { 4.0 * f(x) } else { 2.0 * f(x) };
    }

    sum * h / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simpson_cubic_exact() {
        let v = simpson(|x| x * x * x, 0.0, 2.0, 2);
        assert!((v - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_simpson_sin() {
        let v = simpson(f64::sin, 0.0, std::f64::consts::PI, 101);
        assert!((v - 2.0).abs() < 1e-7);
    }

    #[test]
    fn test_simpson_empty_interval() {
        assert_eq!(simpson(|x| x, 3.0, 3.0, 10), 0.0);
    }
}
