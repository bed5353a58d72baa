//! # 球形 top-hat 变换
//!
//! 计算实空间 top-hat 平滑后的方差及其导数：
//!
//! ```text
//! T_n[f](R) = 1/(2π²) ∫ k³ f(k) [dⁿ/dxⁿ W²(x)]_{x=kR} dln k
//! W(x) = 3 (sin x - x cos x) / x³ = 3 j₁(x) / x
//! ```
//!
//! n = 0、f = P 给出 σ²(R)；n = 1、f = P·k 给出 dσ²/dR。
//!
//! ## 算法
//! 1. 输入谱在 ln k 上重采样为均匀网格（正值时 log-log 线性插值）
//! 2. 两端按边缘两点的幂律外推若干个数量级
//! 3. 输出半径网格 R_i = 1/k_i，点数与输入相同
//! 4. 对每个 R 做梯形积分（ln k 均匀网格上为指数收敛）
//! 5. 采样不足以分辨振荡的高 x 区域使用相位平均后的核，抑制振铃
//!
//! ## 依赖关系
//! - 被 `hmf/variance.rs` 调用
//! - 使用 `rayon` 在半径上并行

use crate::error::{HmfError, Result};
use crate::numeric::interp;

use rayon::prelude::*;
use std::f64::consts::{LN_10, PI};

/// x 小于此值时使用级数展开
const SERIES_THRESHOLD: f64 = 0.1;

/// x · Δln k 超过此值时核改用相位平均
const RINGING_THRESHOLD: f64 = 0.5;

/// top-hat 变换后端
pub trait TophatTransform: Send + Sync {
    /// 返回 (递增的半径网格, 变换值)
    fn transform(&self, k: &[f64], fk: &[f64], deriv: usize) -> Result<(Vec<f64>, Vec<f64>)>;
}

/// ln k 求积后端
#[derive(Debug, Clone, Copy)]
pub struct QuadratureTophat {
    /// 积分网格相对输出网格的加密倍数，至少为 1
    oversample: usize,
    /// 两端各外推的数量级，非负有限
    extrap_decades: f64,
}

impl Default for QuadratureTophat {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl QuadratureTophat {
    pub(crate) const DEFAULT: Self = Self {
        oversample: 4,
        extrap_decades: 2.0,
    };

    /// 创建后端，加密倍数钳制到 ≥ 1，外推量级钳制到 ≥ 0
    pub fn new(oversample: usize, extrap_decades: f64) -> Self {
        let extrap_decades = if extrap_decades.is_finite() {
            extrap_decades.max(0.0)
        } else {
            0.0
        };
        Self {
            oversample: oversample.max(1),
            extrap_decades,
        }
    }
}

impl TophatTransform for QuadratureTophat {
    fn transform(&self, k: &[f64], fk: &[f64], deriv: usize) -> Result<(Vec<f64>, Vec<f64>)> {
        if deriv > 1 {
            return Err(HmfError::config(format!(
                "top-hat transform supports derivative order 0 or 1, got {}",
                deriv
            )));
        }
        if k.len() != fk.len() {
            return Err(HmfError::shape(format!(
                "transform input length mismatch: {} k values, {} f(k) values",
                k.len(),
                fk.len()
            )));
        }
        let n = k.len();
        if n < 2 {
            return Err(HmfError::shape(format!(
                "transform needs at least 2 samples, got {}",
                n
            )));
        }

        let sampler = Extrapolator::new(k, fk);
        let ln_k_min = k[0].ln();
        let ln_k_max = k[n - 1].ln();
        let out_step = (ln_k_max - ln_k_min) / (n - 1) as f64;

        // R_i = 1/k_i，递增
        let radii: Vec<f64> = (0..n)
            .map(|i| (-(ln_k_max - i as f64 * out_step)).exp())
            .collect();

        let pad = self.extrap_decades * LN_10;
        let lo = ln_k_min - pad;
        let hi = ln_k_max + pad;
        let m = ((hi - lo) / out_step * self.oversample as f64).ceil() as usize + 1;
        let step = (hi - lo) / (m - 1) as f64;

        // 梯形权重并入 k³ f(k)
        let nodes: Vec<(f64, f64)> = (0..m)
            .map(|j| {
                let ln_k = lo + j as f64 * step;
                let kv = ln_k.exp();
                let w = if j == 0 || j == m - 1 { 0.5 } else { 1.0 };
                (kv, w * kv * kv * kv * sampler.eval(ln_k))
            })
            .collect();

        let norm = step / (2.0 * PI * PI);
        let values: Vec<f64> = radii
            .par_iter()
            .map(|&r| {
                let sum: f64 = nodes
                    .iter()
                    .map(|&(kv, weight)| {
                        let x = kv * r;
                        weight * kernel(x, deriv, x * step > RINGING_THRESHOLD)
                    })
                    .sum();
                sum * norm
            })
            .collect();

        log::trace!(
            "top-hat transform: {} radii, {} quadrature nodes, deriv {}",
            n,
            m,
            deriv
        );

        Ok((radii, values))
    }
}

/// 输入谱在 ln k 上的插值与幂律外推
struct Extrapolator {
    ln_k: Vec<f64>,
    /// log-log 模式下存 ln f，否则存 f
    values: Vec<f64>,
    log_log: bool,
    low_slope: f64,
    high_slope: f64,
}

impl Extrapolator {
    fn new(k: &[f64], fk: &[f64]) -> Self {
        let ln_k: Vec<f64> = k.iter().map(|v| v.ln()).collect();
        let log_log = fk.iter().all(|v| *v > 0.0);
        let values: Vec<f64> = if log_log {
            fk.iter().map(|v| v.ln()).collect()
        } else {
            fk.to_vec()
        };

        let n = ln_k.len();
        let (low_slope, high_slope) = if log_log {
            (
                (values[1] - values[0]) / (ln_k[1] - ln_k[0]),
                (values[n - 1] - values[n - 2]) / (ln_k[n - 1] - ln_k[n - 2]),
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            ln_k,
            values,
            log_log,
            low_slope,
            high_slope,
        }
    }

    fn eval(&self, ln_k: f64) -> f64 {
        let n = self.ln_k.len();
        let first = self.ln_k[0];
        let last = self.ln_k[n - 1];

        if !self.log_log {
            // 无法做幂律外推，范围外取零
            if ln_k < first || ln_k > last {
                return 0.0;
            }
            return interp(ln_k, &self.ln_k, &self.values);
        }

        let ln_f = if ln_k < first {
            self.values[0] + self.low_slope * (ln_k - first)
        } else if ln_k > last {
            self.values[n - 1] + self.high_slope * (ln_k - last)
        } else {
            interp(ln_k, &self.ln_k, &self.values)
        };
        ln_f.exp()
    }
}

/// 窗函数 W(x)
pub fn window(x: f64) -> f64 {
    if x.abs() < SERIES_THRESHOLD {
        let x2 = x * x;
        1.0 + x2 * (-1.0 / 10.0 + x2 * (1.0 / 280.0 - x2 / 15120.0))
    } else {
        3.0 * (x.sin() - x * x.cos()) / (x * x * x)
    }
}

/// 窗函数导数 W'(x)
pub fn window_derivative(x: f64) -> f64 {
    if x.abs() < SERIES_THRESHOLD {
        let x2 = x * x;
        x * (-1.0 / 5.0 + x2 * (1.0 / 70.0 - x2 / 2520.0))
    } else {
        let (s, c) = x.sin_cos();
        3.0 * ((x * x - 3.0) * s + 3.0 * x * c) / (x * x * x * x)
    }
}

/// 积分核 dⁿ/dxⁿ W²(x)
fn kernel(x: f64, deriv: usize, averaged: bool) -> f64 {
    match (deriv, averaged) {
        (0, false) => {
            let w = window(x);
            w * w
        }
        (_, false) => 2.0 * window(x) * window_derivative(x),
        // <W²> = 9(1 + x²) / (2x⁶)
        (0, true) => 4.5 * (1.0 + x * x) / x.powi(6),
        // d<W²>/dx = -9(2x² + 3) / x⁷
        (_, true) => -9.0 * (2.0 * x * x + 3.0) / x.powi(7),
    }
}
