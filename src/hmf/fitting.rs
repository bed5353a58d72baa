//! # 多重性函数 f(σ)
//!
//! Tinker et al. 2008 拟合函数：
//!
//! ```text
//! alpha = 10^(-(0.75 / log10(Δ/75))^1.2)
//! A(z) = A(Δ)(1+z)^-0.14,  a(z) = a(Δ)(1+z)^-0.06
//! b(z) = b(Δ)(1+z)^-alpha, c(z) = c(Δ)
//! f(σ) = A [(σ/b)^-a + 1] exp(-c/σ²)
//! ```
//!
//! 拟合函数族与质量定义是封闭枚举，在构造时绑定参数表。
//!
//! ## 依赖关系
//! - 被 `hmf/mass_function.rs` 调用
//! - 使用 `hmf/params.rs` 的 ParameterTable

use crate::error::{HmfError, Result};
use crate::hmf::params::{FitParameter, ParameterTable};

use std::fmt;
use std::str::FromStr;

/// 拟合函数族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HmfFamily {
    /// Tinker et al. 2008
    #[default]
    Tinker08,
}

impl FromStr for HmfFamily {
    type Err = HmfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Tinker08" => Ok(HmfFamily::Tinker08),
            other => Err(HmfError::config(format!(
                "unsupported mass function family '{}' (supported: Tinker08)",
                other
            ))),
        }
    }
}

impl fmt::Display for HmfFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HmfFamily::Tinker08 => write!(f, "Tinker08"),
        }
    }
}

/// 质量定义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MassDefinition {
    /// 500 倍临界密度
    #[default]
    Critical500,
}

impl MassDefinition {
    /// 转换为拟合函数需要的相对平均密度的 Δ
    ///
    /// `rescale = Ω_m0 (1+z)³ / E(z)²` 即 Ω_m(z)。假设 ΛCDM 类背景。
    pub fn delta_mean(&self, om0: f64, z: f64, e_z: f64) -> Result<f64> {
        let rescale = om0 * (1.0 + z).powi(3) / (e_z * e_z);
        if !(rescale.is_finite() && rescale > 0.0) {
            return Err(HmfError::domain(format!(
                "cannot convert overdensity: Om(z) = {} at z = {}",
                rescale, z
            )));
        }
        match self {
            MassDefinition::Critical500 => Ok(500.0 / rescale),
        }
    }
}

impl FromStr for MassDefinition {
    type Err = HmfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "500c" => Ok(MassDefinition::Critical500),
            _ => Err(HmfError::config(format!(
                "unsupported mass definition '{}' (supported: 500c)",
                s
            ))),
        }
    }
}

impl fmt::Display for MassDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MassDefinition::Critical500 => write!(f, "500c"),
        }
    }
}

/// 红移演化后的拟合参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolvedParameters {
    pub amplitude: f64,
    pub slope: f64,
    pub scale: f64,
    pub cutoff: f64,
}

/// 多重性函数
#[derive(Debug, Clone, Copy)]
pub struct FittingFunction {
    family: HmfFamily,
    table: &'static ParameterTable,
}

impl FittingFunction {
    /// 绑定拟合函数族与质量定义
    pub fn new(family: HmfFamily, mass_definition: MassDefinition) -> Self {
        Self {
            family,
            table: ParameterTable::for_model(family, mass_definition),
        }
    }

    /// b(z) 的红移演化指数 alpha(Δ)
    pub fn alpha(delta: f64) -> Result<f64> {
        if !delta.is_finite() || delta <= 0.0 {
            return Err(HmfError::domain(format!(
                "overdensity must be positive and finite, got {}",
                delta
            )));
        }
        if delta == 75.0 {
            return Err(HmfError::domain(
                "alpha is undefined at Delta = 75 (log10(Delta/75) = 0)".to_string(),
            ));
        }
        let log_ratio = (delta / 75.0).log10();
        if log_ratio < 0.0 {
            return Err(HmfError::domain(format!(
                "alpha is undefined for Delta = {} < 75 (negative base in fractional power)",
                delta
            )));
        }
        Ok(10f64.powf(-(0.75 / log_ratio).powf(1.2)))
    }

    /// 红移 z、过密度 Δ 处的参数
    pub fn parameters(&self, redshift: f64, delta: f64) -> Result<EvolvedParameters> {
        match self.family {
            HmfFamily::Tinker08 => {
                let alpha = Self::alpha(delta)?;
                let zp1 = 1.0 + redshift;
                Ok(EvolvedParameters {
                    amplitude: self.table.lookup(FitParameter::Amplitude, delta) * zp1.powf(-0.14),
                    slope: self.table.lookup(FitParameter::Slope, delta) * zp1.powf(-0.06),
                    scale: self.table.lookup(FitParameter::Scale, delta) * zp1.powf(-alpha),
                    cutoff: self.table.lookup(FitParameter::Cutoff, delta),
                })
            }
        }
    }

    /// 逐元素计算 f(σ)
    pub fn evaluate(&self, sigma: &[f64], redshift: f64, delta: f64) -> Result<Vec<f64>> {
        let p = self.parameters(redshift, delta)?;
        sigma
            .iter()
            .map(|&s| {
                if !(s.is_finite() && s > 0.0) {
                    return Err(HmfError::domain(format!(
                        "multiplicity function needs sigma > 0, got {}",
                        s
                    )));
                }
                Ok(p.amplitude * ((s / p.scale).powf(-p.slope) + 1.0) * (-p.cutoff / (s * s)).exp())
            })
            .collect()
    }
}
