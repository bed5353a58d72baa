//! # 晕质量函数
//!
//! 组合方差场与多重性函数，得到 dn/dM 或 dn/dlnM：
//!
//! ```text
//! ρ_m   = ρ_c(0) · Ω_m0                     (M_sun/Mpc³)
//! R     = (3M / 4πρ_m)^(1/3)
//! dM/dR = 4πρ_m R²
//! Δ_m   = 500 / [Ω_m0 (1+z)³ / E(z)²]      (500c -> 平均密度)
//! dn/dM = -f(σ) ρ_m / (M dM/dR) · (dσ/dR) / σ
//! ```
//!
//! dσ/dR 通常为负，符号翻转使结果为正。
//!
//! ## 生命周期
//! - 配置阶段: `HaloMassFunction::new`，之后不可变
//! - 计算阶段: `eval_hmf`，可重入；诊断量随结果返回，实例无可变状态
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 `cosmology/` 的 CosmologyProvider
//! - 使用 `hmf/variance.rs`, `hmf/fitting.rs`

use crate::constants::PhysicalConstants;
use crate::cosmology::CosmologyProvider;
use crate::error::{HmfError, Result};
use crate::hmf::fitting::{FittingFunction, HmfFamily, MassDefinition};
use crate::hmf::tophat::{QuadratureTophat, TophatTransform};
use crate::hmf::variance::{DerivativeMode, VarianceField};
use crate::numeric::{geomspace, linspace};

use rayon::prelude::*;
use std::f64::consts::PI;
use std::sync::Arc;

/// 质量函数配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HmfConfig {
    pub family: HmfFamily,
    pub mass_definition: MassDefinition,
    /// 质量下限 (M_sun)
    pub m_min: f64,
    /// 质量上限 (M_sun)
    pub m_max: f64,
    pub n_points: usize,
    pub derivative: DerivativeMode,
}

impl Default for HmfConfig {
    fn default() -> Self {
        Self {
            family: HmfFamily::Tinker08,
            mass_definition: MassDefinition::Critical500,
            m_min: 1e13,
            m_max: 1e16,
            n_points: 1000,
            derivative: DerivativeMode::Numerical,
        }
    }
}

impl HmfConfig {
    /// 创建并校验配置
    pub fn new(
        family: HmfFamily,
        mass_definition: MassDefinition,
        m_min: f64,
        m_max: f64,
        n_points: usize,
        derivative: DerivativeMode,
    ) -> Result<Self> {
        let config = Self {
            family,
            mass_definition,
            m_min,
            m_max,
            n_points,
            derivative,
        };
        config.validate()?;
        Ok(config)
    }

    /// 由字符串标签创建
    pub fn from_tags(
        family: &str,
        mass_definition: &str,
        m_min: f64,
        m_max: f64,
        n_points: usize,
        derivative: &str,
    ) -> Result<Self> {
        Self::new(
            family.parse()?,
            mass_definition.parse()?,
            m_min,
            m_max,
            n_points,
            derivative.parse()?,
        )
    }

    /// 校验 0 < M_min < M_max 且 n_points ≥ 2
    pub fn validate(&self) -> Result<()> {
        if !(self.m_min.is_finite() && self.m_min > 0.0) {
            return Err(HmfError::domain(format!(
                "M_min must be positive, got {:e}",
                self.m_min
            )));
        }
        if !(self.m_max.is_finite() && self.m_max > self.m_min) {
            return Err(HmfError::config(format!(
                "mass range must satisfy M_min < M_max (got {:e} - {:e})",
                self.m_min, self.m_max
            )));
        }
        if self.n_points < 2 {
            return Err(HmfError::config(format!(
                "mass grid needs at least 2 points, got {}",
                self.n_points
            )));
        }
        Ok(())
    }

    /// 质量网格：线性等距或 ln M 等距
    pub fn mass_grid(&self, log: bool) -> Vec<f64> {
        if log {
            geomspace(self.m_min, self.m_max, self.n_points)
        } else {
            linspace(self.m_min, self.m_max, self.n_points)
        }
    }
}

/// 质量函数结果及诊断量，各数组与网格逐点对齐
#[derive(Debug, Clone, PartialEq)]
pub struct MassFunctionResult {
    pub redshift: f64,
    /// 网格为 ln M、值为 dn/dlnM
    pub log: bool,
    /// 是否乘以 dV/dz/dΩ
    pub volume_element: bool,
    /// M (M_sun) 或 ln M
    pub grid: Vec<f64>,
    /// dn/dM (Mpc⁻³ M_sun⁻¹) 或 dn/dlnM (Mpc⁻³)，可乘体积元
    pub hmf: Vec<f64>,
    pub mass: Vec<f64>,
    /// top-hat 半径 (Mpc)
    pub radius: Vec<f64>,
    pub sigma: Vec<f64>,
    pub dsigma_dr: Vec<f64>,
    pub fsigma: Vec<f64>,
    /// 相对平均密度的过密度
    pub delta_mean: f64,
    /// 平均物质密度 (M_sun/Mpc³)
    pub rho_m: f64,
}

impl MassFunctionResult {
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}

/// 晕质量函数
pub struct HaloMassFunction<'a, P: CosmologyProvider + ?Sized> {
    cosmology: &'a P,
    config: HmfConfig,
    fitting: FittingFunction,
    transform: Arc<dyn TophatTransform>,
    /// ρ_c(z=0) (M_sun/Mpc³)
    rho_c_0: f64,
    om0: f64,
    h: f64,
}

impl<'a, P: CosmologyProvider + ?Sized> HaloMassFunction<'a, P> {
    /// 配置阶段：校验配置并读取宇宙学参数
    pub fn new(cosmology: &'a P, config: HmfConfig) -> Result<Self> {
        config.validate()?;

        let params = cosmology.cosmo_params();
        let om0 = params.om0()?;
        let h = params.h()?;

        let constants = PhysicalConstants::default();
        let rho_c_0 = cosmology.critical_density(0.0) * constants.kg_m3_to_msun_mpc3();
        if !(rho_c_0.is_finite() && rho_c_0 > 0.0) {
            return Err(HmfError::domain(format!(
                "critical density must be positive, got {:e} M_sun/Mpc^3",
                rho_c_0
            )));
        }

        log::debug!(
            "halo mass function: {} / {}, M = [{:e}, {:e}] x {}, {} derivative, rho_c0 = {:.4e}",
            config.family,
            config.mass_definition,
            config.m_min,
            config.m_max,
            config.n_points,
            config.derivative,
            rho_c_0
        );

        Ok(Self {
            cosmology,
            config,
            fitting: FittingFunction::new(config.family, config.mass_definition),
            transform: Arc::new(QuadratureTophat::default()),
            rho_c_0,
            om0,
            h,
        })
    }

    /// 替换 top-hat 变换后端
    pub fn with_transform(mut self, transform: Arc<dyn TophatTransform>) -> Self {
        self.transform = transform;
        self
    }

    pub fn config(&self) -> &HmfConfig {
        &self.config
    }

    /// 平均物质密度 ρ_m = ρ_c(0) Ω_m0 (M_sun/Mpc³)
    pub fn mean_matter_density(&self) -> f64 {
        self.rho_c_0 * self.om0
    }

    /// 相对平均密度的过密度 Δ_m(z)
    pub fn delta_mean(&self, redshift: f64) -> Result<f64> {
        let e_z = self.cosmology.hubble_rate(redshift) / (self.h * 100.0);
        self.config
            .mass_definition
            .delta_mean(self.om0, redshift, e_z)
    }

    /// 计算红移 z 处的质量函数
    pub fn eval_hmf(
        &self,
        redshift: f64,
        log: bool,
        volume_element: bool,
    ) -> Result<MassFunctionResult> {
        if !(redshift.is_finite() && redshift >= 0.0) {
            return Err(HmfError::domain(format!(
                "redshift must be non-negative, got {}",
                redshift
            )));
        }

        let spectrum = self.cosmology.linear_power_spectrum(redshift)?;
        let masses = self.config.mass_grid(log);
        let rho_m = self.mean_matter_density();

        let mut field = VarianceField::with_transform(&spectrum, self.transform.as_ref())?;
        field.compute_derivative(self.config.derivative)?;
        let sampled = field.sigma_at_mass(&masses, rho_m, true)?;
        let dsigma_dr = sampled
            .dsigma_dr
            .ok_or_else(|| HmfError::config("derivative missing from variance field"))?;
        let (radius, sigma) = (sampled.radius, sampled.sigma);

        let delta = self.delta_mean(redshift)?;
        let fsigma = self.fitting.evaluate(&sigma, redshift, delta)?;

        for (name, len) in [
            ("sigma", sigma.len()),
            ("dsigma_dr", dsigma_dr.len()),
            ("fsigma", fsigma.len()),
        ] {
            if len != masses.len() {
                return Err(HmfError::shape(format!(
                    "{} has {} entries, mass grid has {}",
                    name,
                    len,
                    masses.len()
                )));
            }
        }

        let mut hmf: Vec<f64> = (0..masses.len())
            .map(|i| {
                let r = radius[i];
                let dm_dr = 4.0 * PI * rho_m * r * r;
                -fsigma[i] * rho_m / (masses[i] * dm_dr) * dsigma_dr[i] / sigma[i]
            })
            .collect();

        let grid = if log {
            for (value, m) in hmf.iter_mut().zip(&masses) {
                *value *= m;
            }
            masses.iter().map(|m| m.ln()).collect()
        } else {
            masses.clone()
        };

        if volume_element {
            let dv = self.cosmology.differential_comoving_volume(redshift);
            for value in hmf.iter_mut() {
                *value *= dv;
            }
        }

        log::debug!(
            "z = {}: Delta_m = {:.2}, rho_m = {:.4e}, sigma in [{:.4}, {:.4}]",
            redshift,
            delta,
            rho_m,
            sigma.last().copied().unwrap_or(f64::NAN),
            sigma.first().copied().unwrap_or(f64::NAN)
        );

        Ok(MassFunctionResult {
            redshift,
            log,
            volume_element,
            grid,
            hmf,
            mass: masses,
            radius,
            sigma,
            dsigma_dr,
            fsigma,
            delta_mean: delta,
            rho_m,
        })
    }

    /// 并行计算多个红移，结果顺序与输入一致
    pub fn eval_many(
        &self,
        redshifts: &[f64],
        log: bool,
        volume_element: bool,
    ) -> Result<Vec<MassFunctionResult>>
    where
        P: Sync,
    {
        redshifts
            .par_iter()
            .map(|&z| self.eval_hmf(z, log, volume_element))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosmology::{CosmoParams, FlatLambdaCdm, LinearCosmology, PowerSpectrum};
    use crate::hmf::variance::{mass_to_radius, radius_to_mass};
    use crate::numeric::geomspace;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const VOLUME: f64 = 1234.5;

    /// 幂律谱、常数体积元的测试提供者
    struct PowerLawCosmology {
        params: CosmoParams,
        spectrum: PowerSpectrum,
        background: FlatLambdaCdm,
    }

    impl PowerLawCosmology {
        fn new() -> Self {
            let k = geomspace(1e-3, 1e1, 200);
            let pk = k.iter().map(|v| v.powf(-1.5)).collect();
            let spectrum = PowerSpectrum::new(k, pk)
                .unwrap()
                .normalized_to_sigma8(0.8, 0.7)
                .unwrap();
            Self {
                params: CosmoParams::new().with("Om0", 0.3).with("h", 0.7),
                spectrum,
                background: FlatLambdaCdm::new(0.7, 0.3).unwrap(),
            }
        }
    }

    impl CosmologyProvider for PowerLawCosmology {
        fn critical_density(&self, z: f64) -> f64 {
            self.background.critical_density(z)
        }

        fn hubble_rate(&self, z: f64) -> f64 {
            self.background.hubble_rate(z)
        }

        fn differential_comoving_volume(&self, _z: f64) -> f64 {
            VOLUME
        }

        fn cosmo_params(&self) -> &CosmoParams {
            &self.params
        }

        fn linear_power_spectrum(&self, _z: f64) -> Result<PowerSpectrum> {
            Ok(self.spectrum.clone())
        }
    }

    fn config(n_points: usize, derivative: DerivativeMode) -> HmfConfig {
        HmfConfig::new(
            HmfFamily::Tinker08,
            MassDefinition::Critical500,
            1e13,
            1e16,
            n_points,
            derivative,
        )
        .unwrap()
    }

    #[test]
    fn test_output_length_matches_n_points() {
        let cosmo = PowerLawCosmology::new();
        for n in [2, 7, 64] {
            for mode in [DerivativeMode::Analytical, DerivativeMode::Numerical] {
                let hmf = HaloMassFunction::new(&cosmo, config(n, mode)).unwrap();
                for log in [false, true] {
                    let res = hmf.eval_hmf(0.5, log, false).unwrap();
                    assert_eq!(res.len(), n);
                    assert_eq!(res.hmf.len(), n);
                    assert_eq!(res.sigma.len(), n);
                    assert_eq!(res.dsigma_dr.len(), n);
                    assert_eq!(res.fsigma.len(), n);
                    assert_eq!(res.radius.len(), n);
                }
            }
        }
    }

    #[test]
    fn test_log_grid_is_mass_weighted_linear() {
        let cosmo = PowerLawCosmology::new();
        let hmf = HaloMassFunction::new(&cosmo, config(40, DerivativeMode::Numerical)).unwrap();
        let lin = hmf.eval_hmf(0.0, false, false).unwrap();
        let log = hmf.eval_hmf(0.0, true, false).unwrap();

        for (i, j) in [(0, 0), (39, 39)] {
            assert!((log.grid[j] - lin.grid[i].ln()).abs() < 1e-12);
            let expected = lin.hmf[i] * lin.grid[i];
            assert!((log.hmf[j] / expected - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_volume_element_multiplies_exactly() {
        let cosmo = PowerLawCosmology::new();
        let hmf = HaloMassFunction::new(&cosmo, config(30, DerivativeMode::Analytical)).unwrap();
        let plain = hmf.eval_hmf(1.0, true, false).unwrap();
        let scaled = hmf.eval_hmf(1.0, true, true).unwrap();
        for (a, b) in plain.hmf.iter().zip(&scaled.hmf) {
            assert_eq!(*b, *a * VOLUME);
        }
        assert!(scaled.volume_element);
    }

    #[test]
    fn test_abundance_positive_and_decreasing() {
        let cosmo = PowerLawCosmology::new();
        let hmf = HaloMassFunction::new(&cosmo, config(50, DerivativeMode::Analytical)).unwrap();
        let res = hmf.eval_hmf(0.0, true, false).unwrap();
        assert!(res.hmf.iter().all(|v| *v > 0.0));
        assert!(res.hmf.windows(2).all(|w| w[1] < w[0]));
        assert!(res.dsigma_dr.iter().all(|v| *v < 0.0));
    }

    #[test]
    fn test_derivative_modes_give_same_abundance() {
        let cosmo = PowerLawCosmology::new();
        let a = HaloMassFunction::new(&cosmo, config(20, DerivativeMode::Analytical))
            .unwrap()
            .eval_hmf(0.3, true, false)
            .unwrap();
        let n = HaloMassFunction::new(&cosmo, config(20, DerivativeMode::Numerical))
            .unwrap()
            .eval_hmf(0.3, true, false)
            .unwrap();
        for (x, y) in a.hmf.iter().zip(&n.hmf) {
            assert!((x / y - 1.0).abs() < 1e-2);
        }
    }

    #[test]
    fn test_diagnostics_are_consistent() {
        let cosmo = PowerLawCosmology::new();
        let hmf = HaloMassFunction::new(&cosmo, config(10, DerivativeMode::Numerical)).unwrap();
        let res = hmf.eval_hmf(0.0, false, false).unwrap();

        assert!((res.delta_mean - 500.0 / 0.3).abs() < 1e-9);
        assert_eq!(res.rho_m, hmf.mean_matter_density());
        for (m, r) in res.mass.iter().zip(&res.radius) {
            assert!((r / mass_to_radius(*m, res.rho_m) - 1.0).abs() < 1e-14);
            assert!((radius_to_mass(*r, res.rho_m) / m - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_delta_mean_decreases_with_redshift() {
        let cosmo = PowerLawCosmology::new();
        let hmf = HaloMassFunction::new(&cosmo, HmfConfig::default()).unwrap();
        let d0 = hmf.delta_mean(0.0).unwrap();
        let d1 = hmf.delta_mean(1.0).unwrap();
        assert!(d1 < d0);
        assert!(d1 > 500.0);
    }

    #[test]
    fn test_eval_many_matches_sequential() {
        let cosmo = PowerLawCosmology::new();
        let hmf = HaloMassFunction::new(&cosmo, config(16, DerivativeMode::Numerical)).unwrap();
        let zs = [0.0, 0.5, 1.0];
        let many = hmf.eval_many(&zs, false, false).unwrap();
        for (z, res) in zs.iter().zip(&many) {
            assert_eq!(res, &hmf.eval_hmf(*z, false, false).unwrap());
        }
    }

    #[test]
    fn test_negative_redshift_rejected() {
        let cosmo = PowerLawCosmology::new();
        let hmf = HaloMassFunction::new(&cosmo, config(4, DerivativeMode::Numerical)).unwrap();
        assert!(matches!(
            hmf.eval_hmf(-0.1, false, false).unwrap_err(),
            HmfError::DomainError(_)
        ));
    }

    #[test]
    fn test_invalid_configurations() {
        let bad_range = HmfConfig::new(
            HmfFamily::Tinker08,
            MassDefinition::Critical500,
            1e15,
            1e14,
            10,
            DerivativeMode::Numerical,
        );
        assert!(matches!(bad_range.unwrap_err(), HmfError::ConfigurationError(_)));

        let one_point = HmfConfig::from_tags("Tinker08", "500c", 1e13, 1e15, 1, "numerical");
        assert!(matches!(one_point.unwrap_err(), HmfError::ConfigurationError(_)));

        let zero_mass = HmfConfig::from_tags("Tinker08", "500c", 0.0, 1e15, 10, "numerical");
        assert!(matches!(zero_mass.unwrap_err(), HmfError::DomainError(_)));

        let family = HmfConfig::from_tags("Tinker10", "500c", 1e13, 1e15, 10, "numerical");
        assert!(matches!(family.unwrap_err(), HmfError::ConfigurationError(_)));
    }

    #[test]
    fn test_missing_cosmology_parameter() {
        struct NoOm0(PowerLawCosmology, CosmoParams);
        impl CosmologyProvider for NoOm0 {
            fn critical_density(&self, z: f64) -> f64 {
                self.0.critical_density(z)
            }
            fn hubble_rate(&self, z: f64) -> f64 {
                self.0.hubble_rate(z)
            }
            fn differential_comoving_volume(&self, z: f64) -> f64 {
                self.0.differential_comoving_volume(z)
            }
            fn cosmo_params(&self) -> &CosmoParams {
                &self.1
            }
            fn linear_power_spectrum(&self, z: f64) -> Result<PowerSpectrum> {
                self.0.linear_power_spectrum(z)
            }
        }

        let cosmo = NoOm0(PowerLawCosmology::new(), CosmoParams::new().with("h", 0.7));
        let err = HaloMassFunction::new(&cosmo, HmfConfig::default()).err().unwrap();
        assert!(matches!(err, HmfError::ConfigurationError(_)));
    }

    #[test]
    fn test_bbks_cluster_abundance_magnitude() {
        let bg = FlatLambdaCdm::new(0.7, 0.3).unwrap();
        let ps = PowerSpectrum::bbks(0.7, 0.3, 0.96, 0.8, (1e-4, 1e2), 300).unwrap();
        let cosmo = LinearCosmology::new(bg, ps, 0.0).unwrap();
        let cfg = HmfConfig::new(
            HmfFamily::Tinker08,
            MassDefinition::Critical500,
            1e13,
            1e15,
            3,
            DerivativeMode::Analytical,
        )
        .unwrap();
        let res = HaloMassFunction::new(&cosmo, cfg)
            .unwrap()
            .eval_hmf(0.0, true, false)
            .unwrap();

        // dn/dlnM (Mpc⁻³) at 1e13, 1e14, 1e15 M_sun
        assert!(res.hmf[0] > 5e-5 && res.hmf[0] < 5e-4);
        assert!(res.hmf[1] > 5e-6 && res.hmf[1] < 2e-5);
        assert!(res.hmf[2] > 1e-8 && res.hmf[2] < 2e-7);

        // 高红移丰度更低
        let high_z = HaloMassFunction::new(&cosmo, cfg)
            .unwrap()
            .eval_hmf(1.0, true, false)
            .unwrap();
        assert!(high_z.hmf[2] < res.hmf[2]);
    }

    /// σ = AMPLITUDE / R 的解析后端，记录各阶变换的调用次数
    #[derive(Default)]
    struct InverseRadiusTophat {
        calls: [AtomicUsize; 2],
    }

    impl InverseRadiusTophat {
        const AMPLITUDE: f64 = 8.0;
    }

    impl TophatTransform for InverseRadiusTophat {
        fn transform(&self, _k: &[f64], _fk: &[f64], deriv: usize) -> Result<(Vec<f64>, Vec<f64>)> {
            if deriv > 1 {
                return Err(HmfError::config(format!("unsupported order {}", deriv)));
            }
            self.calls[deriv].fetch_add(1, Ordering::SeqCst);

            let a2 = Self::AMPLITUDE * Self::AMPLITUDE;
            let radius = geomspace(0.1, 1000.0, 4001);
            let values = radius
                .iter()
                .map(|r| match deriv {
                    0 => a2 / (r * r),
                    _ => -2.0 * a2 / (r * r * r),
                })
                .collect();
            Ok((radius, values))
        }
    }

    #[test]
    fn test_custom_transform_drives_evaluation() {
        let cosmo = PowerLawCosmology::new();
        for mode in [DerivativeMode::Analytical, DerivativeMode::Numerical] {
            let backend = Arc::new(InverseRadiusTophat::default());
            let hmf = HaloMassFunction::new(&cosmo, config(25, mode))
                .unwrap()
                .with_transform(backend.clone());
            let res = hmf.eval_hmf(0.0, true, false).unwrap();

            let derivative_calls = backend.calls[1].load(Ordering::SeqCst);
            assert_eq!(backend.calls[0].load(Ordering::SeqCst), 1);
            match mode {
                DerivativeMode::Analytical => assert_eq!(derivative_calls, 1),
                DerivativeMode::Numerical => assert_eq!(derivative_calls, 0),
            }

            let amp = InverseRadiusTophat::AMPLITUDE;
            for i in 0..res.len() {
                let r = res.radius[i];
                assert!((res.sigma[i] * r / amp - 1.0).abs() < 1e-4, "{} i = {}", mode, i);
                assert!(
                    (res.dsigma_dr[i] * r * r / -amp - 1.0).abs() < 1e-4,
                    "{} i = {}",
                    mode,
                    i
                );
                // σ ∝ 1/R => dn/dlnM = f(σ) ρ_m / (3M)
                let expected = res.fsigma[i] * res.rho_m / (3.0 * res.mass[i]);
                assert!((res.hmf[i] / expected - 1.0).abs() < 1e-3, "{} i = {}", mode, i);
            }
        }
    }
}
