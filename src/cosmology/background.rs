//! # 平直 ΛCDM 背景宇宙学
//!
//! E(z) = sqrt(Ω_m (1+z)³ + 1 - Ω_m)，忽略辐射。
//!
//! ## 提供的量
//! - H(z) = 100 h E(z) km/s/Mpc
//! - ρ_c(z) = 3H²/(8πG)，单位 kg/m³
//! - D_C(z) = (c/H0) ∫₀^z dz'/E(z')
//! - dV/dz/dΩ = (c/H0) D_C² / E(z)
//! - 线性增长因子 D(z) ∝ E(a) ∫₀^a da'/(a' E(a'))³，归一化 D(0) = 1
//!
//! ## 依赖关系
//! - 被 `cosmology/linear.rs` 使用
//! - 使用 `constants.rs`, `numeric/quadrature.rs`

use crate::constants::PhysicalConstants;
use crate::cosmology::CosmoParams;
use crate::error::{HmfError, Result};
use crate::numeric::simpson;

use std::f64::consts::PI;

/// 每单位红移的积分区间数
const INTERVALS_PER_UNIT_Z: f64 = 256.0;

/// 增长因子积分区间数
const GROWTH_INTERVALS: usize = 2048;

/// 平直 ΛCDM 背景
#[derive(Debug, Clone)]
pub struct FlatLambdaCdm {
    h: f64,
    om0: f64,
    params: CosmoParams,
    constants: PhysicalConstants,
}

impl FlatLambdaCdm {
    /// 由 h 与 Ω_m0 创建
    pub fn new(h: f64, om0: f64) -> Result<Self> {
        if !(h.is_finite() && h > 0.0) {
            return Err(HmfError::domain(format!("h must be positive, got {}", h)));
        }
        if !(om0.is_finite() && om0 > 0.0 && om0 <= 1.0) {
            return Err(HmfError::domain(format!(
                "Om0 must lie in (0, 1] for a flat background, got {}",
                om0
            )));
        }

        let params = CosmoParams::new()
            .with("h", h)
            .with("Om0", om0)
            .with("Ode0", 1.0 - om0)
            .with("H0", 100.0 * h);

        Ok(Self {
            h,
            om0,
            params,
            constants: PhysicalConstants::default(),
        })
    }

    /// 无量纲 Hubble 参数
    pub fn h(&self) -> f64 {
        self.h
    }

    /// 物质密度参数
    pub fn om0(&self) -> f64 {
        self.om0
    }

    /// 参数映射
    pub fn params(&self) -> &CosmoParams {
        &self.params
    }

    /// E(z) = H(z)/H0
    pub fn efunc(&self, z: f64) -> f64 {
        let zp1 = 1.0 + z;
        (self.om0 * zp1 * zp1 * zp1 + (1.0 - self.om0)).sqrt()
    }

    /// H(z) (km/s/Mpc)
    pub fn hubble_rate(&self, z: f64) -> f64 {
        100.0 * self.h * self.efunc(z)
    }

    /// ρ_c(z) (kg/m³)
    pub fn critical_density(&self, z: f64) -> f64 {
        let hz = self.hubble_rate(z) * self.constants.kms_mpc_to_per_second();
        3.0 * hz * hz / (8.0 * PI * self.constants.gravitational_constant)
    }

    /// Hubble 距离 c/H0 (Mpc)
    pub fn hubble_distance(&self) -> f64 {
        self.constants.speed_of_light_kms() / (100.0 * self.h)
    }

    /// 视线方向共动距离 (Mpc)
    pub fn comoving_distance(&self, z: f64) -> f64 {
        if z <= 0.0 {
            return 0.0;
        }
        let intervals = (z * INTERVALS_PER_UNIT_Z).ceil() as usize;
        let integral = simpson(|zp| 1.0 / self.efunc(zp), 0.0, z, intervals.max(16));
        self.hubble_distance() * integral
    }

    /// 微分共动体积元 dV/dz/dΩ (Mpc³/sr)
    pub fn differential_comoving_volume(&self, z: f64) -> f64 {
        let dc = self.comoving_distance(z);
        self.hubble_distance() * dc * dc / self.efunc(z)
    }

    /// 线性增长因子，归一化 D(z=0) = 1
    pub fn growth_factor(&self, z: f64) -> f64 {
        self.unnormalized_growth(1.0 / (1.0 + z)) / self.unnormalized_growth(1.0)
    }

    /// g(a) = E(a) ∫₀^a da'/(a' E(a'))³
    fn unnormalized_growth(&self, a: f64) -> f64 {
        let integrand = |x: f64| {
            if x <= 0.0 {
                return 0.0;
            }
            let ae = x * self.efunc(1.0 / x - 1.0);
            1.0 / (ae * ae * ae)
        };
        self.efunc(1.0 / a - 1.0) * simpson(integrand, 0.0, a, GROWTH_INTERVALS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_efunc_today() {
        let c = FlatLambdaCdm::new(0.7, 0.3).unwrap();
        assert!((c.efunc(0.0) - 1.0).abs() < 1e-14);
        assert!((c.hubble_rate(0.0) - 70.0).abs() < 1e-12);
    }

    #[test]
    fn test_critical_density_scales_with_e2() {
        let c = FlatLambdaCdm::new(0.7, 0.3).unwrap();
        let ratio = c.critical_density(1.0) / c.critical_density(0.0);
        let e = c.efunc(1.0);
        assert!((ratio - e * e).abs() < 1e-10);
        // ρ_c0 ≈ 9.2e-27 kg/m³ for h = 0.7
        assert!((c.critical_density(0.0) / 9.2e-27 - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_einstein_de_sitter_distance() {
        // Ω_m = 1: D_C = 2(c/H0)(1 - 1/sqrt(1+z))
        let c = FlatLambdaCdm::new(0.7, 1.0).unwrap();
        let z = 1.5;
        let expected = 2.0 * c.hubble_distance() * (1.0 - 1.0 / (1.0_f64 + z).sqrt());
        assert!((c.comoving_distance(z) / expected - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_einstein_de_sitter_growth() {
        // Ω_m = 1: D(a) = a
        let c = FlatLambdaCdm::new(0.7, 1.0).unwrap();
        for z in [0.5, 1.0, 3.0] {
            assert!((c.growth_factor(z) - 1.0 / (1.0 + z)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_lcdm_growth_suppressed() {
        // Λ 抑制晚期增长，归一化到今天时 D(z)(1+z) > 1
        let c = FlatLambdaCdm::new(0.7, 0.3).unwrap();
        assert!((c.growth_factor(0.0) - 1.0).abs() < 1e-14);
        let d1 = c.growth_factor(1.0);
        assert!(d1 * 2.0 > 1.0);
        assert!(d1 < 0.65 && d1 > 0.55);
    }

    #[test]
    fn test_volume_element_positive() {
        let c = FlatLambdaCdm::new(0.7, 0.3).unwrap();
        assert_eq!(c.differential_comoving_volume(0.0), 0.0);
        assert!(c.differential_comoving_volume(0.5) > 0.0);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(FlatLambdaCdm::new(-0.7, 0.3).is_err());
        assert!(FlatLambdaCdm::new(0.7, 0.0).is_err());
        assert!(FlatLambdaCdm::new(0.7, 1.2).is_err());
    }
}
