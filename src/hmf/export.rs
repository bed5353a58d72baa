//! # 结果导出
//!
//! 导出质量函数与 σ(R) 表为 CSV。
//!
//! ## 支持格式
//! - 质量函数: `grid,mass,hmf,sigma,dsigma_dr,radius,fsigma`
//! - σ(R): `radius,sigma,dsigma_dr`（未计算导数时该列为空）
//!
//! ## 依赖关系
//! - 被 `commands/eval.rs`, `commands/scan.rs`, `commands/sigma.rs` 调用
//! - 使用 `hmf/mass_function.rs` 的 MassFunctionResult
//! - 使用 `csv` + `serde` 写入

use crate::error::{HmfError, Result};
use crate::hmf::MassFunctionResult;

use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct MassFunctionRow {
    grid: f64,
    mass: f64,
    hmf: f64,
    sigma: f64,
    dsigma_dr: f64,
    radius: f64,
    fsigma: f64,
}

#[derive(Debug, Serialize)]
struct SigmaRow {
    radius: f64,
    sigma: f64,
    dsigma_dr: Option<f64>,
}

/// 导出质量函数为 CSV
pub fn to_csv(result: &MassFunctionResult, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for i in 0..result.len() {
        wtr.serialize(MassFunctionRow {
            grid: result.grid[i],
            mass: result.mass[i],
            hmf: result.hmf[i],
            sigma: result.sigma[i],
            dsigma_dr: result.dsigma_dr[i],
            radius: result.radius[i],
            fsigma: result.fsigma[i],
        })?;
    }

    wtr.flush().map_err(|e| HmfError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 导出 σ(R) 表为 CSV
pub fn sigma_to_csv(
    radius: &[f64],
    sigma: &[f64],
    dsigma_dr: Option<&[f64]>,
    output_path: &Path,
) -> Result<()> {
    if radius.len() != sigma.len() || dsigma_dr.is_some_and(|d| d.len() != radius.len()) {
        return Err(HmfError::shape(format!(
            "sigma table columns differ in length ({} radii, {} sigma)",
            radius.len(),
            sigma.len()
        )));
    }

    let mut wtr = csv::Writer::from_path(output_path)?;

    for (i, (r, s)) in radius.iter().zip(sigma).enumerate() {
        wtr.serialize(SigmaRow {
            radius: *r,
            sigma: *s,
            dsigma_dr: dsigma_dr.map(|d| d[i]),
        })?;
    }

    wtr.flush().map_err(|e| HmfError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
