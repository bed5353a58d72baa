//! # 线性宇宙学提供者
//!
//! 组合平直 ΛCDM 背景与某一参考红移处的功率谱样本，
//! 其他红移处的谱按线性增长因子缩放：
//! P(k, z) = P(k, z_ref) · [D(z) / D(z_ref)]²
//!
//! ## 依赖关系
//! - 被 `commands/` 构造，传给 `hmf/mass_function.rs`
//! - 使用 `cosmology/background.rs`, `cosmology/spectrum.rs`

use crate::cosmology::{CosmoParams, CosmologyProvider, FlatLambdaCdm, PowerSpectrum};
use crate::error::{HmfError, Result};

/// 背景 + 线性功率谱
#[derive(Debug, Clone)]
pub struct LinearCosmology {
    background: FlatLambdaCdm,
    spectrum: PowerSpectrum,
    spectrum_redshift: f64,
    params: CosmoParams,
}

impl LinearCosmology {
    /// 创建提供者，`spectrum` 为红移 `spectrum_redshift` 处的线性谱
    pub fn new(
        background: FlatLambdaCdm,
        spectrum: PowerSpectrum,
        spectrum_redshift: f64,
    ) -> Result<Self> {
        if !(spectrum_redshift.is_finite() && spectrum_redshift >= 0.0) {
            return Err(HmfError::domain(format!(
                "spectrum redshift must be non-negative, got {}",
                spectrum_redshift
            )));
        }
        let params = background.params().clone();
        Ok(Self {
            background,
            spectrum,
            spectrum_redshift,
            params,
        })
    }

    /// 附加额外参数（如 sigma8）
    pub fn with_param(mut self, name: &str, value: f64) -> Self {
        self.params.insert(name, value);
        self
    }

    /// 背景宇宙学
    pub fn background(&self) -> &FlatLambdaCdm {
        &self.background
    }
}

impl CosmologyProvider for LinearCosmology {
    fn critical_density(&self, z: f64) -> f64 {
        self.background.critical_density(z)
    }

    fn hubble_rate(&self, z: f64) -> f64 {
        self.background.hubble_rate(z)
    }

    fn differential_comoving_volume(&self, z: f64) -> f64 {
        self.background.differential_comoving_volume(z)
    }

    fn cosmo_params(&self) -> &CosmoParams {
        &self.params
    }

    fn linear_power_spectrum(&self, z: f64) -> Result<PowerSpectrum> {
        if !(z.is_finite() && z >= 0.0) {
            return Err(HmfError::domain(format!(
                "redshift must be non-negative, got {}",
                z
            )));
        }
        if z == self.spectrum_redshift {
            return Ok(self.spectrum.clone());
        }
        let growth =
            self.background.growth_factor(z) / self.background.growth_factor(self.spectrum_redshift);
        log::trace!(
            "rescaling spectrum from z = {} to z = {} (D ratio {:.6})",
            self.spectrum_redshift,
            z,
            growth
        );
        Ok(self.spectrum.scaled(growth * growth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> LinearCosmology {
        let bg = FlatLambdaCdm::new(0.7, 0.3).unwrap();
        let ps = PowerSpectrum::new(vec![0.01, 0.1, 1.0], vec![1e4, 5e3, 1e2]).unwrap();
        LinearCosmology::new(bg, ps, 0.0).unwrap()
    }

    #[test]
    fn test_spectrum_at_reference_redshift_unchanged() {
        let p = provider();
        let ps = p.linear_power_spectrum(0.0).unwrap();
        assert_eq!(ps.pk(), &[1e4, 5e3, 1e2]);
    }

    #[test]
    fn test_spectrum_scaled_by_growth_squared() {
        let p = provider();
        let d = p.background().growth_factor(1.0);
        let ps = p.linear_power_spectrum(1.0).unwrap();
        assert!((ps.pk()[0] / 1e4 - d * d).abs() < 1e-12);
    }

    #[test]
    fn test_negative_redshift_rejected() {
        let p = provider();
        assert!(matches!(
            p.linear_power_spectrum(-0.5).unwrap_err(),
            HmfError::DomainError(_)
        ));
    }

    #[test]
    fn test_params_exposed() {
        let p = provider().with_param("sigma8", 0.8);
        assert_eq!(p.cosmo_params().om0().unwrap(), 0.3);
        assert_eq!(p.cosmo_params().get("sigma8").unwrap(), 0.8);
    }
}
