//! # 质量函数图表
//!
//! 使用 `plotters` 生成 log-log 图：
//! - 多个红移的质量函数叠加（dn/dM 或 dn/dlnM 对 M）
//! - σ(R) 曲线
//!
//! 支持 PNG 和 SVG 输出。
//!
//! ## 依赖关系
//! - 被 `commands/eval.rs`, `commands/scan.rs`, `commands/sigma.rs` 调用
//! - 使用 `hmf/mass_function.rs` 的 MassFunctionResult
//! - 使用 `plotters` 渲染图表

use crate::error::{HmfError, Result};
use crate::hmf::MassFunctionResult;

use plotters::prelude::*;
use std::path::Path;

/// 曲线配色，按红移顺序循环使用
const PALETTE: [RGBColor; 6] = [
    RGBColor(0, 102, 204),
    RGBColor(204, 51, 0),
    RGBColor(0, 153, 76),
    RGBColor(153, 0, 153),
    RGBColor(230, 159, 0),
    RGBColor(64, 64, 64),
];

/// 生成质量函数图表
pub fn generate_hmf_plot(
    results: &[MassFunctionResult],
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    let curves: Vec<(String, Vec<(f64, f64)>)> = results
        .iter()
        .map(|r| {
            let points = r
                .mass
                .iter()
                .zip(&r.hmf)
                .filter(|(m, v)| **m > 0.0 && **v > 0.0 && v.is_finite())
                .map(|(m, v)| (*m, *v))
                .collect();
            (format!("z = {}", r.redshift), points)
        })
        .collect();

    let log = results.first().map(|r| r.log).unwrap_or(true);
    let volume = results.first().map(|r| r.volume_element).unwrap_or(false);
    let y_desc = match (log, volume) {
        (true, false) => "dn/dlnM (Mpc⁻³)",
        (false, false) => "dn/dM (Mpc⁻³ M☉⁻¹)",
        (true, true) => "dN/dlnM/dz/dΩ (sr⁻¹)",
        (false, true) => "dN/dM/dz/dΩ (M☉⁻¹ sr⁻¹)",
    };

    let axes = Axes {
        title,
        x_desc: "M (M☉)",
        y_desc,
    };
    render(&curves, &axes, output_path, width, height, use_svg)
}

/// 生成 σ(R) 图表
pub fn generate_sigma_plot(
    radius: &[f64],
    sigma: &[f64],
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    let points: Vec<(f64, f64)> = radius
        .iter()
        .zip(sigma)
        .filter(|(r, s)| **r > 0.0 && **s > 0.0)
        .map(|(r, s)| (*r, *s))
        .collect();

    let axes = Axes {
        title,
        x_desc: "R (Mpc)",
        y_desc: "σ(R)",
    };
    render(
        &[("σ(R)".to_string(), points)],
        &axes,
        output_path,
        width,
        height,
        use_svg,
    )
}

struct Axes<'a> {
    title: &'a str,
    x_desc: &'a str,
    y_desc: &'a str,
}

fn render(
    curves: &[(String, Vec<(f64, f64)>)],
    axes: &Axes,
    output_path: &Path,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_loglog_chart(&root, curves, axes)?;
        root.present()
            .map_err(|e| HmfError::PlotError(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_loglog_chart(&root, curves, axes)?;
        root.present()
            .map_err(|e| HmfError::PlotError(e.to_string()))?;
    }
    Ok(())
}

/// 数据范围，按整数量级取整
fn decade_bounds<'a>(values: impl Iterator<Item = &'a f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(*v), hi.max(*v))
    });
    if !(lo.is_finite() && hi.is_finite() && lo > 0.0) {
        return None;
    }
    let lo = 10f64.powf(lo.log10().floor());
    let hi = 10f64.powf(hi.log10().ceil());
    if hi > lo {
        Some((lo, hi))
    } else {
        Some((lo, lo * 10.0))
    }
}

/// 绘制 log-log 图表的核心逻辑
fn draw_loglog_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    curves: &[(String, Vec<(f64, f64)>)],
    axes: &Axes,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| HmfError::PlotError(format!("{:?}", e)))?;

    let x_range = decade_bounds(curves.iter().flat_map(|(_, p)| p.iter().map(|(x, _)| x)));
    let y_range = decade_bounds(curves.iter().flat_map(|(_, p)| p.iter().map(|(_, y)| y)));
    let ((x_min, x_max), (y_min, y_max)) = match (x_range, y_range) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            return Err(HmfError::PlotError(
                "no positive finite points to draw on log axes".to_string(),
            ))
        }
    };

    let mut chart = ChartBuilder::on(root)
        .caption(axes.title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d((x_min..x_max).log_scale(), (y_min..y_max).log_scale())
        .map_err(|e| HmfError::PlotError(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc(axes.x_desc)
        .y_desc(axes.y_desc)
        .x_label_formatter(&|v| format!("{:.0e}", v))
        .y_label_formatter(&|v| format!("{:.0e}", v))
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| HmfError::PlotError(format!("{:?}", e)))?;

    for (i, (label, points)) in curves.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                color.stroke_width(2),
            ))
            .map_err(|e| HmfError::PlotError(format!("{:?}", e)))?
            .label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if curves.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", 14))
            .draw()
            .map_err(|e| HmfError::PlotError(format!("{:?}", e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decade_bounds() {
        let v = [3e13, 2e15];
        let (lo, hi) = decade_bounds(v.iter()).unwrap();
        assert!((lo / 1e13 - 1.0).abs() < 1e-12);
        assert!((hi / 1e16 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_decade_bounds_single_value() {
        let (lo, hi) = decade_bounds([1e14].iter()).unwrap();
        assert!(hi > lo);
    }

    #[test]
    fn test_decade_bounds_rejects_empty() {
        let empty: [f64; 0] = [];
        assert!(decade_bounds(empty.iter()).is_none());
        assert!(decade_bounds([0.0, 1.0].iter()).is_none());
    }

    #[test]
    fn test_plot_without_points_fails() {
        let path = std::env::temp_dir().join(format!("halomass_empty_{}.svg", std::process::id()));
        let err = generate_sigma_plot(&[1.0, 2.0], &[0.0, -1.0], &path, "sigma", 400, 300, true)
            .unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, HmfError::PlotError(_)));
    }
}
