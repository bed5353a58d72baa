//! # sigma 子命令实现
//!
//! 输出指定红移处的 σ(R)（可选 dσ/dR），并报告 σ(8 Mpc/h)。
//!
//! ## 依赖关系
//! - 使用 `cli/sigma.rs` 定义的 SigmaArgs
//! - 使用 halomass 的 VarianceField

use crate::cli::common::OutputFormat;
use crate::cli::sigma::SigmaArgs;
use crate::commands::common;
use crate::utils::{output, table};
use halomass::cosmology::CosmologyProvider;
use halomass::error::Result;
use halomass::hmf::{export, plot, DerivativeMode, VarianceField};
use halomass::numeric::interp;

/// 执行 sigma
pub fn execute(args: SigmaArgs) -> Result<()> {
    output::print_header("Smoothed Density Variance σ(R)");

    let mode: Option<DerivativeMode> = args
        .derivative
        .as_deref()
        .map(str::parse::<DerivativeMode>)
        .transpose()?;

    let cosmology = common::build_cosmology(&args.cosmology)?;
    let spectrum = cosmology.linear_power_spectrum(args.redshift)?;
    output::print_kv("Redshift", &args.redshift.to_string());
    output::print_kv(
        "k range (1/Mpc)",
        &format!(
            "{:.3e} - {:.3e}, {} samples",
            spectrum.k()[0],
            spectrum.k()[spectrum.len() - 1],
            spectrum.len()
        ),
    );

    let mut field = VarianceField::new(&spectrum)?;
    if let Some(mode) = mode {
        field.compute_derivative(mode)?;
        output::print_kv("dσ/dR", &mode.to_string());
    }

    let r8 = 8.0 / args.cosmology.hubble;
    output::print_success(&format!(
        "σ(R = 8 Mpc/h = {:.3} Mpc) = {:.4}",
        r8,
        field.sigma_at_radius(r8)
    ));

    match &args.radii {
        Some(list) => {
            let radii = common::parse_list(list, "radius")?;
            let sigma: Vec<f64> = radii.iter().map(|&r| field.sigma_at_radius(r)).collect();
            let dsigma: Option<Vec<f64>> = field
                .dsigma_dr()
                .map(|d| radii.iter().map(|&r| interp(r, field.radius(), d)).collect());
            table::print_sigma(&radii, &sigma, dsigma.as_deref(), radii.len());
        }
        None => table::print_sigma(field.radius(), field.sigma(), field.dsigma_dr(), args.rows),
    }

    if let Some(path) = &args.output {
        let format = args
            .format
            .unwrap_or_else(|| common::guess_format_from_extension(path));
        match format {
            OutputFormat::Csv => {
                export::sigma_to_csv(field.radius(), field.sigma(), field.dsigma_dr(), path)?
            }
            OutputFormat::Png | OutputFormat::Svg => {
                let title = args
                    .figure
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("σ(R), z = {}", args.redshift));
                plot::generate_sigma_plot(
                    field.radius(),
                    field.sigma(),
                    path,
                    &title,
                    args.figure.width,
                    args.figure.height,
                    format == OutputFormat::Svg,
                )?
            }
        }
        output::print_saved("σ(R) table", path);
    }

    Ok(())
}
