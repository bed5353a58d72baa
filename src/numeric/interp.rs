//! # 插值与差分
//!
//! 约定：
//! - 插值超出节点范围时取边界值（平坦外推）
//! - 梯度内部点使用二阶非均匀中心差分，两端使用一阶单侧差分
//!
//! ## 依赖关系
//! - 被 `hmf/params.rs`, `hmf/variance.rs`, `hmf/tophat.rs` 调用
//! - 使用 `error.rs`

use crate::error::{HmfError, Result};

/// 一维线性插值，边界钳制
///
/// `xp` 必须严格递增且非空，`fp` 与 `xp` 等长（由调用方保证）。
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len();
    if x.is_nan() {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }

    // xp[j - 1] <= x < xp[j]
    let j = xp.partition_point(|&v| v <= x);
    let i = j - 1;
    let t = (x - xp[i]) / (xp[j] - xp[i]);
    fp[i] + t * (fp[j] - fp[i])
}

/// 对一组横坐标批量插值
pub fn interp_many(xs: &[f64], xp: &[f64], fp: &[f64]) -> Result<Vec<f64>> {
    if xp.is_empty() {
        return Err(HmfError::shape("interpolation table is empty"));
    }
    if xp.len() != fp.len() {
        return Err(HmfError::shape(format!(
            "interpolation table length mismatch: {} nodes, {} values",
            xp.len(),
            fp.len()
        )));
    }
    Ok(xs.iter().map(|&x| interp(x, xp, fp)).collect())
}

/// 非均匀网格上的数值梯度 df/dx
pub fn gradient(f: &[f64], x: &[f64]) -> Result<Vec<f64>> {
    let n = f.len();
    if n != x.len() {
        return Err(HmfError::shape(format!(
            "gradient length mismatch: {} values, {} coordinates",
            n,
            x.len()
        )));
    }
    if n < 2 {
        return Err(HmfError::shape(
            "gradient needs at least 2 points".to_string(),
        ));
    }

    let mut out = vec![0.0; n];
    out[0] = (f[1] - f[0]) / (x[1] - x[0]);
    out[n - 1] = (f[n - 1] - f[n - 2]) / (x[n - 1] - x[n - 2]);

    for i in 1..n - 1 {
        let hd = x[i] - x[i - 1];
        let hs = x[i + 1] - x[i];
        out[i] = (hd * hd * f[i + 1] + (hs * hs - hd * hd) * f[i] - hs * hs * f[i - 1])
            / (hs * hd * (hd + hs));
    }

    Ok(out)
}

/// [start, stop] 上的 n 个等距点（包含端点）
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut v: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            v[n - 1] = stop;
            v
        }
    }
}

/// ln 等距的 n 个点，即 exp(linspace(ln start, ln stop, n))
pub fn geomspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    linspace(start.ln(), stop.ln(), n)
        .into_iter()
        .map(f64::exp)
        .collect()
}
