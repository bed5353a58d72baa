//! # 宇宙学接口模块
//!
//! 质量函数核心只通过 [`CosmologyProvider`] 访问背景宇宙学与线性功率谱。
//! 本模块同时提供一套参考实现，使命令行工具可以独立运行。
//!
//! ## 子模块
//! - `background`: 平直 ΛCDM 背景（H(z)、临界密度、共动体积元、增长因子）
//! - `spectrum`: 功率谱样本（CSV 读取、BBKS 解析谱、σ8 归一化）
//! - `linear`: 背景 + 功率谱 + 线性增长缩放的组合提供者
//!
//! ## 单位约定
//! - 临界密度: kg/m³ (SI)
//! - Hubble 率: km/s/Mpc
//! - 共动体积元 dV/dz/dΩ: Mpc³/sr
//! - k: 1/Mpc, P(k): Mpc³
//!
//! ## 依赖关系
//! - 被 `hmf/mass_function.rs` 与 `commands/` 使用
//! - 使用 `numeric/`, `constants.rs`

pub mod background;
pub mod linear;
pub mod spectrum;

pub use background::FlatLambdaCdm;
pub use linear::LinearCosmology;
pub use spectrum::PowerSpectrum;

use crate::error::{HmfError, Result};

use std::collections::BTreeMap;

/// 宇宙学参数映射（至少包含 `Om0` 与 `h`）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CosmoParams {
    values: BTreeMap<String, f64>,
}

impl CosmoParams {
    /// 创建空参数表
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式添加参数
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    /// 设置参数
    pub fn insert(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    /// 读取参数，缺失或非有限值时返回 ConfigurationError
    pub fn get(&self, name: &str) -> Result<f64> {
        match self.values.get(name) {
            Some(v) if v.is_finite() => Ok(*v),
            Some(v) => Err(HmfError::config(format!(
                "cosmology parameter '{}' is not finite ({})",
                name, v
            ))),
            None => Err(HmfError::config(format!(
                "cosmology provider does not expose parameter '{}'",
                name
            ))),
        }
    }

    /// 物质密度参数 Ω_m0
    pub fn om0(&self) -> Result<f64> {
        self.get("Om0")
    }

    /// 无量纲 Hubble 参数 h
    pub fn h(&self) -> Result<f64> {
        self.get("h")
    }

    /// 遍历所有参数
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// 宇宙学提供者
///
/// 调用方持有实现，核心只借用，从不修改。
pub trait CosmologyProvider {
    /// 红移 z 处的临界密度 (kg/m³)
    fn critical_density(&self, z: f64) -> f64;

    /// 红移 z 处的 Hubble 率 H(z) (km/s/Mpc)
    fn hubble_rate(&self, z: f64) -> f64;

    /// 微分共动体积元 dV/dz/dΩ (Mpc³/sr)
    fn differential_comoving_volume(&self, z: f64) -> f64;

    /// 宇宙学参数映射
    fn cosmo_params(&self) -> &CosmoParams;

    /// 红移 z 处的线性物质功率谱
    fn linear_power_spectrum(&self, z: f64) -> Result<PowerSpectrum>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_lookup() {
        let p = CosmoParams::new().with("Om0", 0.3).with("h", 0.7);
        assert_eq!(p.om0().unwrap(), 0.3);
        assert_eq!(p.h().unwrap(), 0.7);
        assert_eq!(p.iter().count(), 2);
    }

    #[test]
    fn test_params_missing_is_configuration_error() {
        let p = CosmoParams::new().with("h", 0.7);
        let err = p.om0().unwrap_err();
        assert!(matches!(err, HmfError::ConfigurationError(_)));
    }

    #[test]
    fn test_params_nan_rejected() {
        let mut p = CosmoParams::new();
        p.insert("Om0", f64::NAN);
        assert!(p.om0().is_err());
    }
}
