//! # 线性功率谱样本
//!
//! (k, P(k)) 有序样本，k 严格递增且为正，构造后不可变。
//!
//! ## 来源
//! - CSV 文本（两列 k, P(k)，`#` 开头为注释，可带一行表头）
//! - BBKS 解析转移函数 (Bardeen, Bond, Kaiser & Szalay 1986)，按 σ8 归一化
//!
//! ## 依赖关系
//! - 被 `cosmology/linear.rs`, `hmf/variance.rs` 使用
//! - 使用 `csv` 读取文件
//! - σ8 归一化使用 `hmf/variance.rs`

use crate::error::{HmfError, Result};
use crate::hmf::VarianceField;
use crate::numeric::geomspace;

use std::fs;
use std::path::Path;

/// 线性功率谱样本
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSpectrum {
    k: Vec<f64>,
    pk: Vec<f64>,
}

impl PowerSpectrum {
    /// 由 k 与 P(k) 创建并校验
    pub fn new(k: Vec<f64>, pk: Vec<f64>) -> Result<Self> {
        if k.len() != pk.len() {
            return Err(HmfError::shape(format!(
                "power spectrum length mismatch: {} k values, {} P(k) values",
                k.len(),
                pk.len()
            )));
        }
        if k.len() < 2 {
            return Err(HmfError::shape(format!(
                "power spectrum needs at least 2 samples, got {}",
                k.len()
            )));
        }
        if let Some(bad) = k.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
            return Err(HmfError::domain(format!(
                "wavenumbers must be positive and finite, found {}",
                bad
            )));
        }
        if let Some(w) = k.windows(2).find(|w| w[1] <= w[0]) {
            return Err(HmfError::domain(format!(
                "wavenumbers must be strictly increasing ({} followed by {})",
                w[0], w[1]
            )));
        }
        if let Some(bad) = pk.iter().find(|v| !v.is_finite()) {
            return Err(HmfError::domain(format!(
                "power spectrum contains non-finite value {}",
                bad
            )));
        }

        Ok(Self { k, pk })
    }

    /// 读取 CSV 格式功率谱
    pub fn from_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HmfError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| HmfError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut k = Vec::new();
        let mut pk = Vec::new();

        for (line, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() < 2 {
                return Err(parse_error(
                    path,
                    format!("row {} has {} column(s), expected k and P(k)", line + 1, record.len()),
                ));
            }

            match (record[0].parse::<f64>(), record[1].parse::<f64>()) {
                (Ok(kv), Ok(pv)) => {
                    k.push(kv);
                    pk.push(pv);
                }
                // 首行非数值时视为表头
                _ if line == 0 => continue,
                _ => {
                    return Err(parse_error(
                        path,
                        format!("row {} is not numeric: '{}, {}'", line + 1, &record[0], &record[1]),
                    ))
                }
            }
        }

        Self::new(k, pk).map_err(|e| parse_error(path, e.to_string()))
    }

    /// BBKS 功率谱，P(k) = A kⁿˢ T²(k)，振幅按 σ8 归一化
    ///
    /// k 单位为 1/Mpc，在 [k_min, k_max] 上对数等距取 `n_points` 个点。
    pub fn bbks(
        h: f64,
        om0: f64,
        ns: f64,
        sigma8: f64,
        k_range: (f64, f64),
        n_points: usize,
    ) -> Result<Self> {
        if !(sigma8.is_finite() && sigma8 > 0.0) {
            return Err(HmfError::domain(format!(
                "sigma8 must be positive, got {}",
                sigma8
            )));
        }
        if !(h > 0.0 && om0 > 0.0) {
            return Err(HmfError::domain(format!(
                "BBKS spectrum requires h > 0 and Om0 > 0 (h = {}, Om0 = {})",
                h, om0
            )));
        }
        let (k_min, k_max) = k_range;
        if !(k_min > 0.0 && k_max > k_min) {
            return Err(HmfError::InvalidRange(format!(
                "{}-{} (need 0 < k_min < k_max)",
                k_min, k_max
            )));
        }

        let shape = om0 * h * h;
        let k = geomspace(k_min, k_max, n_points);
        let pk = k
            .iter()
            .map(|&kv| kv.powf(ns) * bbks_transfer(kv / shape).powi(2))
            .collect();

        Self::new(k, pk)?.normalized_to_sigma8(sigma8, h)
    }

    /// 重新缩放振幅使 σ(R = 8 Mpc/h) = sigma8
    pub fn normalized_to_sigma8(&self, sigma8: f64, h: f64) -> Result<Self> {
        let field = VarianceField::new(self)?;
        let current = field.sigma_at_radius(8.0 / h);
        if !(current > 0.0) {
            return Err(HmfError::domain(format!(
                "cannot normalise spectrum: sigma(8 Mpc/h) = {}",
                current
            )));
        }
        let ratio = sigma8 / current;
        log::debug!(
            "normalising spectrum: sigma8 {:.4} -> {:.4} (amplitude x{:.4e})",
            current,
            sigma8,
            ratio * ratio
        );
        Ok(self.scaled(ratio * ratio))
    }

    /// 按常数因子缩放 P(k)
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            k: self.k.clone(),
            pk: self.pk.iter().map(|p| p * factor).collect(),
        }
    }

    /// 波数网格 (1/Mpc)
    pub fn k(&self) -> &[f64] {
        &self.k
    }

    /// P(k) (Mpc³)
    pub fn pk(&self) -> &[f64] {
        &self.pk
    }

    /// 样本数
    pub fn len(&self) -> usize {
        self.k.len()
    }

    /// 是否为空（构造保证至少 2 个样本）
    pub fn is_empty(&self) -> bool {
        self.k.is_empty()
    }

    /// P(k)·k，解析导数变换的输入
    pub fn k_weighted(&self) -> Vec<f64> {
        self.k.iter().zip(&self.pk).map(|(k, p)| k * p).collect()
    }
}

/// BBKS 转移函数 T(q)，q = k / (Ω_m h²)
fn bbks_transfer(q: f64) -> f64 {
    if q <= 0.0 {
        return 1.0;
    }
    let x = 2.34 * q;
    let poly = 1.0 + 3.89 * q + (16.1 * q).powi(2) + (5.46 * q).powi(3) + (6.71 * q).powi(4);
    (1.0 + x).ln() / x * poly.powf(-0.25)
}

fn parse_error(path: &Path, reason: String) -> HmfError {
    HmfError::ParseError {
        format: "power spectrum".to_string(),
        path: path.display().to_string(),
        reason,
    }
}
