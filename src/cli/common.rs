//! # 共享参数组
//!
//! 各子命令共用的宇宙学参数与质量函数参数，通过 `#[command(flatten)]` 嵌入。
//! 宇宙学参数也可由 `HALOMASS_*` 环境变量给出。
//!
//! ## 依赖关系
//! - 被 `cli/eval.rs`, `cli/scan.rs`, `cli/sigma.rs` 使用
//! - 参数由 `commands/common.rs` 转换为库类型

use clap::{Args, ValueEnum};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// 宇宙学
// ─────────────────────────────────────────────────────────────

/// 宇宙学参数
#[derive(Args, Debug, Clone)]
pub struct CosmologyArgs {
    /// Present-day matter density parameter
    #[arg(long, env = "HALOMASS_OM0", default_value_t = 0.3)]
    pub om0: f64,

    /// Dimensionless Hubble parameter h = H0 / (100 km/s/Mpc)
    #[arg(long = "h", env = "HALOMASS_H", default_value_t = 0.7)]
    pub hubble: f64,

    /// Amplitude of fluctuations on 8 Mpc/h (BBKS spectrum only)
    #[arg(long, env = "HALOMASS_SIGMA8", default_value_t = 0.8)]
    pub sigma8: f64,

    /// Primordial spectral index (BBKS spectrum only)
    #[arg(long, env = "HALOMASS_NS", default_value_t = 0.96)]
    pub ns: f64,

    /// Tabulated linear power spectrum (CSV: k [1/Mpc], P(k) [Mpc^3]); BBKS if omitted
    #[arg(long, env = "HALOMASS_SPECTRUM")]
    pub spectrum: Option<PathBuf>,

    /// Redshift at which --spectrum is tabulated
    #[arg(long, env = "HALOMASS_SPECTRUM_REDSHIFT", default_value_t = 0.0)]
    pub spectrum_redshift: f64,

    /// k range of the BBKS spectrum in 1/Mpc (e.g., "1e-4:1e2")
    #[arg(long, default_value = "1e-4:1e2")]
    pub k_range: String,

    /// Number of log-spaced k samples of the BBKS spectrum
    #[arg(long, default_value_t = 400)]
    pub k_points: usize,
}

// ─────────────────────────────────────────────────────────────
// 质量函数
// ─────────────────────────────────────────────────────────────

/// 质量函数参数
#[derive(Args, Debug, Clone)]
pub struct HmfArgs {
    /// Fitting-function family
    #[arg(long, default_value = "Tinker08")]
    pub family: String,

    /// Mass definition
    #[arg(long, default_value = "500c")]
    pub mass_def: String,

    /// Lower mass bound in M_sun
    #[arg(long, default_value_t = 1e13)]
    pub m_min: f64,

    /// Upper mass bound in M_sun
    #[arg(long, default_value_t = 1e16)]
    pub m_max: f64,

    /// Number of mass grid points
    #[arg(short = 'n', long, default_value_t = 200)]
    pub n_points: usize,

    /// dsigma/dR evaluation: analytical or numerical
    #[arg(long, default_value = "numerical")]
    pub derivative: String,

    /// Linear mass grid and dn/dM (default: ln M grid and dn/dlnM)
    #[arg(long, default_value_t = false)]
    pub linear: bool,

    /// Multiply by the comoving volume element dV/dz/dOmega
    #[arg(long, default_value_t = false)]
    pub volume_element: bool,
}

// ─────────────────────────────────────────────────────────────
// 输出
// ─────────────────────────────────────────────────────────────

/// 输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// CSV data file
    Csv,
    /// PNG image
    Png,
    /// SVG vector image
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

/// 图像尺寸
#[derive(Args, Debug, Clone)]
pub struct FigureArgs {
    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Plot title
    #[arg(long)]
    pub title: Option<String>,
}
