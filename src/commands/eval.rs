//! # eval 子命令实现
//!
//! 单个红移的质量函数：打印摘要与采样表，可选写出 CSV / PNG / SVG。
//!
//! ## 依赖关系
//! - 使用 `cli/eval.rs` 定义的 EvalArgs
//! - 使用 `commands/common.rs` 构造宇宙学与配置
//! - 使用 halomass 的 HaloMassFunction

use crate::cli::eval::EvalArgs;
use crate::commands::common;
use crate::utils::{output, progress, table};
use halomass::error::Result;
use halomass::hmf::HaloMassFunction;

/// 执行 eval
pub fn execute(args: EvalArgs) -> Result<()> {
    output::print_header("Halo Mass Function");

    let config = common::build_config(&args.hmf)?;
    let cosmology = common::build_cosmology(&args.cosmology)?;
    common::print_setup(&args.cosmology, &config);
    output::print_kv("Redshift", &args.redshift.to_string());

    let hmf = HaloMassFunction::new(&cosmology, config)?;

    let spinner = progress::create_spinner(&format!("Evaluating z = {}", args.redshift));
    let result = hmf.eval_hmf(args.redshift, !args.hmf.linear, args.hmf.volume_element);
    spinner.finish_and_clear();
    let result = result?;

    output::print_success(&format!(
        "Evaluated {} mass points (Δ_mean = {:.2}, ρ_m = {:.4e} M☉/Mpc³)",
        result.len(),
        result.delta_mean,
        result.rho_m
    ));
    if result.volume_element {
        output::print_info("Abundance multiplied by dV/dz/dΩ (Mpc³/sr)");
    }

    table::print_mass_function(&result, args.rows);

    if let Some(path) = &args.output {
        let format = args
            .format
            .unwrap_or_else(|| common::guess_format_from_extension(path));
        common::write_mass_function(std::slice::from_ref(&result), path, format, &args.figure)?;
        output::print_saved("Mass function", path);
    }

    Ok(())
}
