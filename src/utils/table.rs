//! # 终端表格
//!
//! 用 `tabled` 打印质量函数、σ(R) 与扫描汇总表。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `tabled` crate

use crate::utils::output;
use halomass::hmf::MassFunctionResult;

use tabled::{Table, Tabled};

#[derive(Tabled)]
struct MassRow {
    #[tabled(rename = "M (M☉)")]
    mass: String,
    #[tabled(rename = "R (Mpc)")]
    radius: String,
    #[tabled(rename = "σ")]
    sigma: String,
    #[tabled(rename = "f(σ)")]
    fsigma: String,
    #[tabled(rename = "abundance")]
    hmf: String,
}

#[derive(Tabled)]
struct SigmaRow {
    #[tabled(rename = "R (Mpc)")]
    radius: String,
    #[tabled(rename = "σ(R)")]
    sigma: String,
    #[tabled(rename = "dσ/dR")]
    dsigma: String,
}

/// 扫描汇总行
#[derive(Tabled)]
pub struct ScanRow {
    #[tabled(rename = "z")]
    pub redshift: String,
    #[tabled(rename = "Δ_mean")]
    pub delta: String,
    #[tabled(rename = "σ range")]
    pub sigma: String,
    #[tabled(rename = "abundance at M_min")]
    pub first: String,
    #[tabled(rename = "output")]
    pub output: String,
}

impl ScanRow {
    pub fn from_result(result: &MassFunctionResult, output: String) -> Self {
        let (lo, hi) = result
            .sigma
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(*s), hi.max(*s))
            });
        Self {
            redshift: format!("{:.3}", result.redshift),
            delta: format!("{:.1}", result.delta_mean),
            sigma: format!("{:.3} - {:.3}", lo, hi),
            first: result
                .hmf
                .first()
                .map(|v| format!("{:.4e}", v))
                .unwrap_or_default(),
            output,
        }
    }
}

/// 从 0..len 中均匀取至多 `count` 个下标（含两端）
pub fn sample_indices(len: usize, count: usize) -> Vec<usize> {
    if len == 0 || count == 0 {
        return Vec::new();
    }
    if count >= len {
        return (0..len).collect();
    }
    if count == 1 {
        return vec![0];
    }
    let mut idx: Vec<usize> = (0..count)
        .map(|i| (i as f64 * (len - 1) as f64 / (count - 1) as f64).round() as usize)
        .collect();
    idx.dedup();
    idx
}

/// 打印质量函数表
pub fn print_mass_function(result: &MassFunctionResult, count: usize) {
    let rows: Vec<MassRow> = sample_indices(result.len(), count)
        .into_iter()
        .map(|i| MassRow {
            mass: format!("{:.4e}", result.mass[i]),
            radius: format!("{:.4}", result.radius[i]),
            sigma: format!("{:.4}", result.sigma[i]),
            fsigma: format!("{:.4e}", result.fsigma[i]),
            hmf: format!("{:.4e}", result.hmf[i]),
        })
        .collect();

    if !rows.is_empty() {
        let label = if result.log { "dn/dlnM" } else { "dn/dM" };
        output::print_header(&format!("{} at z = {} ({} rows)", label, result.redshift, rows.len()));
        println!("{}", Table::new(&rows));
    }
}

/// 打印 σ(R) 表
pub fn print_sigma(radius: &[f64], sigma: &[f64], dsigma: Option<&[f64]>, count: usize) {
    let rows: Vec<SigmaRow> = sample_indices(radius.len(), count)
        .into_iter()
        .map(|i| SigmaRow {
            radius: format!("{:.4e}", radius[i]),
            sigma: format!("{:.5}", sigma[i]),
            dsigma: dsigma
                .map(|d| format!("{:.4e}", d[i]))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    if !rows.is_empty() {
        output::print_header(&format!("σ(R) ({} rows)", rows.len()));
        println!("{}", Table::new(&rows));
    }
}

/// 打印扫描汇总表
pub fn print_scan_summary(rows: &[ScanRow]) {
    if !rows.is_empty() {
        output::print_header(&format!("Scan summary ({} redshifts)", rows.len()));
        println!("{}", Table::new(rows));
    }
}
