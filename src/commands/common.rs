//! # 命令共享逻辑
//!
//! 将 CLI 参数转换为库类型，解析红移列表 / 范围，写出结果文件。
//!
//! ## 依赖关系
//! - 被 `commands/eval.rs`, `commands/scan.rs`, `commands/sigma.rs` 调用
//! - 使用 `cli/common.rs` 的参数组
//! - 使用 halomass 的 cosmology / hmf 模块

use crate::cli::common::{CosmologyArgs, FigureArgs, HmfArgs, OutputFormat};
use crate::utils::output;
use halomass::cosmology::{FlatLambdaCdm, LinearCosmology, PowerSpectrum};
use halomass::error::{HmfError, Result};
use halomass::hmf::{export, plot, HmfConfig, MassFunctionResult};

use std::path::Path;

/// 由参数构造参考宇宙学：CSV 谱或 BBKS 谱 + 平直 ΛCDM 背景
pub fn build_cosmology(args: &CosmologyArgs) -> Result<LinearCosmology> {
    let (spectrum, spectrum_redshift) = match &args.spectrum {
        Some(path) => (PowerSpectrum::from_csv(path)?, args.spectrum_redshift),
        None => {
            let k_range = parse_k_range(&args.k_range)?;
            let spectrum = PowerSpectrum::bbks(
                args.hubble,
                args.om0,
                args.ns,
                args.sigma8,
                k_range,
                args.k_points,
            )?;
            (spectrum, 0.0)
        }
    };
    build_with_spectrum(args, spectrum, spectrum_redshift)
}

/// 用给定的谱构造参考宇宙学
pub fn build_with_spectrum(
    args: &CosmologyArgs,
    spectrum: PowerSpectrum,
    spectrum_redshift: f64,
) -> Result<LinearCosmology> {
    let background = FlatLambdaCdm::new(args.hubble, args.om0)?;
    Ok(LinearCosmology::new(background, spectrum, spectrum_redshift)?
        .with_param("sigma8", args.sigma8)
        .with_param("ns", args.ns))
}

/// 由参数构造质量函数配置
pub fn build_config(args: &HmfArgs) -> Result<HmfConfig> {
    HmfConfig::from_tags(
        &args.family,
        &args.mass_def,
        args.m_min,
        args.m_max,
        args.n_points,
        &args.derivative,
    )
}

/// 打印配置摘要
pub fn print_setup(cosmology: &CosmologyArgs, config: &HmfConfig) {
    output::print_kv("Om0 / h", &format!("{} / {}", cosmology.om0, cosmology.hubble));
    match &cosmology.spectrum {
        Some(path) => output::print_kv(
            "Power spectrum",
            &format!("{} (z = {})", path.display(), cosmology.spectrum_redshift),
        ),
        None => output::print_kv(
            "Power spectrum",
            &format!("BBKS (sigma8 = {}, ns = {})", cosmology.sigma8, cosmology.ns),
        ),
    }
    output::print_kv(
        "Model",
        &format!("{} / {}", config.family, config.mass_definition),
    );
    output::print_kv(
        "Mass grid",
        &format!(
            "{:.3e} - {:.3e} M☉, {} points",
            config.m_min, config.m_max, config.n_points
        ),
    );
    output::print_kv("dσ/dR", &config.derivative.to_string());
}

/// 解析 k 范围，如 "1e-4:1e2"
pub fn parse_k_range(range: &str) -> Result<(f64, f64)> {
    let (lo, hi) = range
        .split_once(':')
        .ok_or_else(|| HmfError::InvalidRange(format!("{} (expected k_min:k_max)", range)))?;
    let lo: f64 = lo
        .trim()
        .parse()
        .map_err(|_| HmfError::InvalidRange(range.to_string()))?;
    let hi: f64 = hi
        .trim()
        .parse()
        .map_err(|_| HmfError::InvalidRange(range.to_string()))?;
    if !(lo > 0.0 && hi > lo) {
        return Err(HmfError::InvalidRange(format!(
            "{} (must be 0 < k_min < k_max)",
            range
        )));
    }
    Ok((lo, hi))
}

/// 解析逗号分隔的数值列表
pub fn parse_list(list: &str, what: &str) -> Result<Vec<f64>> {
    let values = list
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| HmfError::InvalidArgument(format!("invalid {} '{}'", what, s)))
        })
        .collect::<Result<Vec<f64>>>()?;
    if values.is_empty() {
        return Err(HmfError::InvalidArgument(format!("no {} given", what)));
    }
    Ok(values)
}

/// 解析红移列表 "0,0.5,1"
pub fn parse_redshift_list(list: &str) -> Result<Vec<f64>> {
    let values = parse_list(list, "redshift")?;
    if let Some(z) = values.iter().find(|z| !(z.is_finite() && **z >= 0.0)) {
        return Err(HmfError::InvalidArgument(format!(
            "redshifts must be non-negative, got {}",
            z
        )));
    }
    Ok(values)
}

/// 解析红移范围 "0-2"，按步长取点（含端点）
pub fn parse_redshift_range(range: &str, step: f64) -> Result<Vec<f64>> {
    let parts: Vec<&str> = range.split('-').collect();
    if parts.len() != 2 {
        return Err(HmfError::InvalidRange(range.to_string()));
    }

    let min: f64 = parts[0]
        .trim()
        .parse()
        .map_err(|_| HmfError::InvalidRange(range.to_string()))?;
    let max: f64 = parts[1]
        .trim()
        .parse()
        .map_err(|_| HmfError::InvalidRange(range.to_string()))?;

    if min < 0.0 || max < min {
        return Err(HmfError::InvalidRange(format!(
            "{} (must be 0 <= min <= max)",
            range
        )));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(HmfError::InvalidArgument(format!(
            "redshift step must be positive, got {}",
            step
        )));
    }

    // 取整到 1e-9，消除步长累积误差
    let n = ((max - min) / step + 1e-9).floor() as usize;
    Ok((0..=n)
        .map(|i| ((min + i as f64 * step) * 1e9).round() / 1e9)
        .collect())
}

/// 从文件扩展名推断输出格式
pub fn guess_format_from_extension(path: &Path) -> OutputFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("png") => OutputFormat::Png,
        Some("svg") => OutputFormat::Svg,
        _ => OutputFormat::Csv,
    }
}

/// 写出质量函数（CSV 或图像）
pub fn write_mass_function(
    results: &[MassFunctionResult],
    path: &Path,
    format: OutputFormat,
    figure: &FigureArgs,
) -> Result<()> {
    match format {
        OutputFormat::Csv => match results {
            [single] => export::to_csv(single, path),
            _ => Err(HmfError::InvalidArgument(format!(
                "CSV output holds one redshift, got {}",
                results.len()
            ))),
        },
        OutputFormat::Png | OutputFormat::Svg => {
            let title = figure.title.clone().unwrap_or_else(|| match results {
                [single] => format!("Halo mass function, z = {}", single.redshift),
                _ => "Halo mass function".to_string(),
            });
            plot::generate_hmf_plot(
                results,
                path,
                &title,
                figure.width,
                figure.height,
                format == OutputFormat::Svg,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_redshift_range_inclusive() {
        let z = parse_redshift_range("0-2", 0.25).unwrap();
        assert_eq!(z.len(), 9);
        assert!((z[8] - 2.0).abs() < 1e-12);
        assert_eq!(parse_redshift_range("1-1", 0.5).unwrap(), vec![1.0]);

        let tenths = parse_redshift_range("0-1", 0.1).unwrap();
        assert_eq!(tenths.len(), 11);
        assert_eq!(tenths[3], 0.3);
        assert_eq!(tenths[3].to_string(), "0.3");
    }

    #[test]
    fn test_parse_redshift_range_errors() {
        assert!(matches!(
            parse_redshift_range("2-1", 0.1).unwrap_err(),
            HmfError::InvalidRange(_)
        ));
        assert!(matches!(
            parse_redshift_range("0-1-2", 0.1).unwrap_err(),
            HmfError::InvalidRange(_)
        ));
        assert!(matches!(
            parse_redshift_range("0-1", 0.0).unwrap_err(),
            HmfError::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_parse_redshift_list() {
        assert_eq!(parse_redshift_list("0, 0.5,1").unwrap(), vec![0.0, 0.5, 1.0]);
        assert!(parse_redshift_list("0,-1").is_err());
        assert!(parse_redshift_list("0,abc").is_err());
        assert!(parse_redshift_list(" , ").is_err());
    }

    #[test]
    fn test_parse_k_range() {
        assert_eq!(parse_k_range("1e-4:1e2").unwrap(), (1e-4, 1e2));
        assert!(parse_k_range("1e-4-1e2").is_err());
        assert!(parse_k_range("1:0.1").is_err());
    }

    #[test]
    fn test_guess_format() {
        assert_eq!(guess_format_from_extension(Path::new("a.SVG")), OutputFormat::Svg);
        assert_eq!(guess_format_from_extension(Path::new("a.png")), OutputFormat::Png);
        assert_eq!(guess_format_from_extension(Path::new("a.dat")), OutputFormat::Csv);
    }

    #[test]
    fn test_build_config_from_defaults() {
        let args = HmfArgs {
            family: "Tinker08".to_string(),
            mass_def: "500c".to_string(),
            m_min: 1e13,
            m_max: 1e15,
            n_points: 8,
            derivative: "analytical".to_string(),
            linear: false,
            volume_element: false,
        };
        let config = build_config(&args).unwrap();
        assert_eq!(config.n_points, 8);
        let bad = HmfArgs {
            family: "tinker08".to_string(),
            ..args
        };
        assert!(matches!(
            build_config(&bad).unwrap_err(),
            HmfError::ConfigurationError(_)
        ));
    }
}
