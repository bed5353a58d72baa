//! # 平滑密度场方差 σ(R)
//!
//! 由线性功率谱经 top-hat 变换得到内部半径网格上的 σ²(R)，
//! 按需计算 dσ/dR，并在任意质量 / 半径处插值。
//!
//! ## 导数模式
//! - `Analytical`: 对 P(k)·k 做一阶导数变换得 dσ²/dR，dσ/dR = dσ²/dR / (2σ)
//! - `Numerical`: σ 对 R 的非均匀中心差分（两端单侧差分）
//!
//! ## 外推策略
//! 请求半径超出内部网格时取边界值（平坦外推）。这是有意的近似。
//!
//! ## 依赖关系
//! - 被 `hmf/mass_function.rs` 与 `cosmology/spectrum.rs`（σ8 归一化）调用
//! - 使用 `hmf/tophat.rs` 的 TophatTransform
//! - 使用 `numeric/interp.rs`

use crate::cosmology::PowerSpectrum;
use crate::error::{HmfError, Result};
use crate::hmf::tophat::{QuadratureTophat, TophatTransform};
use crate::numeric::{gradient, interp, interp_many};

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

static DEFAULT_TRANSFORM: QuadratureTophat = QuadratureTophat::DEFAULT;

/// dσ/dR 的计算方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DerivativeMode {
    Analytical,
    #[default]
    Numerical,
}

impl FromStr for DerivativeMode {
    type Err = HmfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "analytical" => Ok(DerivativeMode::Analytical),
            "numerical" => Ok(DerivativeMode::Numerical),
            _ => Err(HmfError::config(format!(
                "unknown derivative mode '{}' (expected analytical or numerical)",
                s
            ))),
        }
    }
}

impl fmt::Display for DerivativeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivativeMode::Analytical => write!(f, "analytical"),
            DerivativeMode::Numerical => write!(f, "numerical"),
        }
    }
}

/// 质量 M 对应的 top-hat 半径 R = (3M / 4πρ_m)^(1/3)
pub fn mass_to_radius(mass: f64, rho_m: f64) -> f64 {
    (3.0 * mass / (4.0 * PI * rho_m)).cbrt()
}

/// 半径 R 内的质量 M = 4/3 π ρ_m R³
pub fn radius_to_mass(radius: f64, rho_m: f64) -> f64 {
    4.0 / 3.0 * PI * rho_m * radius * radius * radius
}

/// 在质量网格上插值得到的 σ（及 dσ/dR）
#[derive(Debug, Clone, PartialEq)]
pub struct SigmaAtMass {
    /// 每个质量对应的半径 R_eval (Mpc)
    pub radius: Vec<f64>,
    pub sigma: Vec<f64>,
    pub dsigma_dr: Option<Vec<f64>>,
}

/// σ(R) 场
pub struct VarianceField<'a> {
    spectrum: &'a PowerSpectrum,
    transform: &'a dyn TophatTransform,
    radius: Vec<f64>,
    variance: Vec<f64>,
    sigma: Vec<f64>,
    dsigma: Option<Vec<f64>>,
}

impl<'a> VarianceField<'a> {
    /// 使用默认求积后端构造
    pub fn new(spectrum: &'a PowerSpectrum) -> Result<Self> {
        Self::with_transform(spectrum, &DEFAULT_TRANSFORM)
    }

    /// 指定变换后端构造
    pub fn with_transform(
        spectrum: &'a PowerSpectrum,
        transform: &'a dyn TophatTransform,
    ) -> Result<Self> {
        let (radius, variance) = transform.transform(spectrum.k(), spectrum.pk(), 0)?;
        if radius.len() != variance.len() {
            return Err(HmfError::shape(format!(
                "transform returned {} radii but {} variances",
                radius.len(),
                variance.len()
            )));
        }
        if let Some((r, v)) = radius
            .iter()
            .zip(&variance)
            .find(|(_, v)| !(v.is_finite() && **v >= 0.0))
        {
            return Err(HmfError::domain(format!(
                "smoothed variance is {} at R = {:.4e} Mpc",
                v, r
            )));
        }

        let sigma = variance.iter().map(|v| v.sqrt()).collect();

        Ok(Self {
            spectrum,
            transform,
            radius,
            variance,
            sigma,
            dsigma: None,
        })
    }

    /// 计算并保存 dσ/dR
    pub fn compute_derivative(&mut self, mode: DerivativeMode) -> Result<&[f64]> {
        let dsigma = match mode {
            DerivativeMode::Analytical => {
                let weighted = self.spectrum.k_weighted();
                let (radius, dvar) = self.transform.transform(self.spectrum.k(), &weighted, 1)?;
                if radius.len() != self.radius.len() {
                    return Err(HmfError::shape(format!(
                        "derivative grid has {} points, variance grid has {}",
                        radius.len(),
                        self.radius.len()
                    )));
                }
                if let Some(r) = self
                    .radius
                    .iter()
                    .zip(&self.sigma)
                    .find(|(_, s)| **s == 0.0)
                    .map(|(r, _)| r)
                {
                    return Err(HmfError::domain(format!(
                        "sigma vanishes at R = {:.4e} Mpc, dsigma/dR undefined",
                        r
                    )));
                }
                dvar.iter()
                    .zip(&self.sigma)
                    .map(|(dv, s)| dv / (2.0 * s))
                    .collect()
            }
            DerivativeMode::Numerical => gradient(&self.sigma, &self.radius)?,
        };

        let stored = self.dsigma.insert(dsigma);
        Ok(stored.as_slice())
    }

    /// 由质量计算 σ（可选 dσ/dR）
    pub fn sigma_at_mass(
        &self,
        masses: &[f64],
        rho_m: f64,
        with_derivative: bool,
    ) -> Result<SigmaAtMass> {
        if !(rho_m.is_finite() && rho_m > 0.0) {
            return Err(HmfError::domain(format!(
                "mean matter density must be positive, got {}",
                rho_m
            )));
        }
        if let Some(m) = masses.iter().find(|m| !(m.is_finite() && **m > 0.0)) {
            return Err(HmfError::domain(format!(
                "halo masses must be positive, got {}",
                m
            )));
        }

        let radius: Vec<f64> = masses.iter().map(|&m| mass_to_radius(m, rho_m)).collect();
        let sigma = interp_many(&radius, &self.radius, &self.sigma)?;

        let dsigma_dr = if with_derivative {
            let dsigma = self.dsigma.as_deref().ok_or_else(|| {
                HmfError::config("dsigma/dR requested before compute_derivative was called")
            })?;
            Some(interp_many(&radius, &self.radius, dsigma)?)
        } else {
            None
        };

        Ok(SigmaAtMass {
            radius,
            sigma,
            dsigma_dr,
        })
    }

    /// 任意半径处的 σ
    pub fn sigma_at_radius(&self, radius: f64) -> f64 {
        interp(radius, &self.radius, &self.sigma)
    }

    /// 内部半径网格 (Mpc)
    pub fn radius(&self) -> &[f64] {
        &self.radius
    }

    /// σ²(R)
    pub fn variance(&self) -> &[f64] {
        &self.variance
    }

    /// σ(R)
    pub fn sigma(&self) -> &[f64] {
        &self.sigma
    }

    /// dσ/dR，未计算时为 None
    pub fn dsigma_dr(&self) -> Option<&[f64]> {
        self.dsigma.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::geomspace;

    const INDEX: f64 = -1.5;

    fn power_law() -> PowerSpectrum {
        let k = geomspace(1e-3, 1e1, 300);
        let pk = k.iter().map(|v| v.powf(INDEX)).collect();
        PowerSpectrum::new(k, pk).unwrap()
    }

    #[test]
    fn test_sigma_decreases_with_radius() {
        let ps = power_law();
        let field = VarianceField::new(&ps).unwrap();
        assert_eq!(field.radius().len(), field.sigma().len());
        assert!(field.radius().windows(2).all(|w| w[1] > w[0]));
        assert!(field.sigma().windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_variance_is_sigma_squared() {
        let ps = power_law();
        let field = VarianceField::new(&ps).unwrap();
        for (v, s) in field.variance().iter().zip(field.sigma()) {
            assert!(*v > 0.0);
            assert!((s * s / v - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_derivative_modes_agree() {
        let ps = power_law();
        let mut analytical = VarianceField::new(&ps).unwrap();
        let mut numerical = VarianceField::new(&ps).unwrap();
        let a = analytical
            .compute_derivative(DerivativeMode::Analytical)
            .unwrap()
            .to_vec();
        let n = numerical
            .compute_derivative(DerivativeMode::Numerical)
            .unwrap()
            .to_vec();

        for i in 75..225 {
            assert!(a[i] < 0.0);
            assert!((n[i] / a[i] - 1.0).abs() < 1e-2, "i = {}", i);
        }
    }

    #[test]
    fn test_analytical_derivative_matches_power_law() {
        // σ ∝ R^-(n+3)/2 => dσ/dR = -(n+3)/2 σ/R
        let ps = power_law();
        let mut field = VarianceField::new(&ps).unwrap();
        field.compute_derivative(DerivativeMode::Analytical).unwrap();
        let d = field.dsigma_dr().unwrap();

        for i in 75..225 {
            let expected = -(INDEX + 3.0) / 2.0 * field.sigma()[i] / field.radius()[i];
            assert!((d[i] / expected - 1.0).abs() < 1e-3, "i = {}", i);
        }
    }

    #[test]
    fn test_mass_radius_round_trip() {
        let rho_m = 4.1e10;
        for m in geomspace(1e10, 1e16, 25) {
            let back = radius_to_mass(mass_to_radius(m, rho_m), rho_m);
            assert!((back / m - 1.0).abs() < 1e-14);
        }
    }

    #[test]
    fn test_sigma_at_mass_hits_grid_nodes() {
        let ps = power_law();
        let field = VarianceField::new(&ps).unwrap();
        let rho_m = 1.0;
        let i = 150;
        let m = radius_to_mass(field.radius()[i], rho_m);
        let out = field.sigma_at_mass(&[m], rho_m, false).unwrap();
        assert!((out.sigma[0] / field.sigma()[i] - 1.0).abs() < 1e-10);
        assert!(out.dsigma_dr.is_none());
    }

    #[test]
    fn test_sigma_at_mass_flat_extrapolation() {
        let ps = power_law();
        let field = VarianceField::new(&ps).unwrap();
        let last = *field.sigma().last().unwrap();
        let first = field.sigma()[0];
        let out = field.sigma_at_mass(&[1e-30, 1e30], 1.0, false).unwrap();
        assert_eq!(out.sigma[0], first);
        assert_eq!(out.sigma[1], last);
    }

    #[test]
    fn test_sigma_at_mass_domain_errors() {
        let ps = power_law();
        let field = VarianceField::new(&ps).unwrap();
        assert!(matches!(
            field.sigma_at_mass(&[1e14], 0.0, false).unwrap_err(),
            HmfError::DomainError(_)
        ));
        assert!(matches!(
            field.sigma_at_mass(&[1e14, -1.0], 1e10, false).unwrap_err(),
            HmfError::DomainError(_)
        ));
    }

    #[test]
    fn test_derivative_required_before_use() {
        let ps = power_law();
        let field = VarianceField::new(&ps).unwrap();
        let err = field.sigma_at_mass(&[1e14], 1e10, true).unwrap_err();
        assert!(matches!(err, HmfError::ConfigurationError(_)));
    }

    #[test]
    fn test_derivative_mode_parse() {
        assert_eq!(
            "Analytical".parse::<DerivativeMode>().unwrap(),
            DerivativeMode::Analytical
        );
        assert_eq!(
            "numerical".parse::<DerivativeMode>().unwrap(),
            DerivativeMode::Numerical
        );
        assert!("spline".parse::<DerivativeMode>().is_err());
    }
}
