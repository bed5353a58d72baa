//! # scan 子命令实现
//!
//! 多红移并行计算质量函数。
//!
//! ## 红移来源
//! - `--redshifts` 列表或 `--range` + `--step`：共用一个宇宙学，谱按增长因子缩放
//! - `--spectra-dir`：每个文件是一个红移处的谱，红移从文件名解析
//!
//! ## 输出
//! - 每个红移一个文件（CSV / PNG / SVG）
//! - 汇总表，可选叠加图 `--plot`
//!
//! ## 依赖关系
//! - 使用 `cli/scan.rs` 定义的 ScanArgs
//! - 使用 `batch/` 模块进行收集与并行
//! - 使用 halomass 的 HaloMassFunction

use crate::batch::collector::{redshift_from_filename, redshift_regex};
use crate::batch::{BatchResult, BatchRunner, FileCollector, ProcessResult};
use crate::cli::common::OutputFormat;
use crate::cli::scan::ScanArgs;
use crate::commands::common;
use crate::utils::output;
use crate::utils::table::{self, ScanRow};
use halomass::cosmology::PowerSpectrum;
use halomass::error::{HmfError, Result};
use halomass::hmf::{HaloMassFunction, HmfConfig, MassFunctionResult};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 单个扫描任务
struct ScanJob {
    redshift: f64,
    /// 该红移处的谱文件（目录模式）
    spectrum: Option<PathBuf>,
    output: PathBuf,
}

/// 单个任务的结果
struct ScanOutcome {
    status: ProcessResult,
    result: Option<MassFunctionResult>,
}

/// 执行 scan
pub fn execute(args: ScanArgs) -> Result<()> {
    output::print_header("Halo Mass Function Redshift Scan");

    let config = common::build_config(&args.hmf)?;
    common::print_setup(&args.cosmology, &config);

    let jobs = plan_jobs(&args)?;
    if jobs.is_empty() {
        output::print_warning("Nothing to evaluate");
        return Ok(());
    }
    output::print_info(&format!("Scanning {} redshifts", jobs.len()));

    fs::create_dir_all(&args.output).map_err(|e| HmfError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Using {} parallel jobs", runner.jobs()));

    let outcomes = if args.spectra_dir.is_some() {
        runner.map(&jobs, "Evaluating", |job| run_file_job(job, &args, config))?
    } else {
        let cosmology = common::build_cosmology(&args.cosmology)?;
        let hmf = HaloMassFunction::new(&cosmology, config)?;
        runner.map(&jobs, "Evaluating", |job| {
            finish_job(job, &args, || {
                hmf.eval_hmf(job.redshift, !args.hmf.linear, args.hmf.volume_element)
            })
        })?
    };

    let mut stats = BatchResult::default();
    let mut rows = Vec::new();
    let mut results = Vec::new();
    for (job, outcome) in jobs.iter().zip(outcomes) {
        stats.merge(&outcome.status);
        match &outcome.status {
            ProcessResult::Success(msg) => output::print_success(msg),
            ProcessResult::Skipped(msg) => output::print_skip(msg),
            ProcessResult::Failed(..) => {}
        }
        if let Some(result) = outcome.result {
            rows.push(ScanRow::from_result(&result, job.output.display().to_string()));
            results.push(result);
        }
    }

    table::print_scan_summary(&rows);

    if let Some(path) = &args.plot {
        if results.is_empty() {
            output::print_warning("No evaluated redshifts, overlay plot not written");
        } else {
            let format = match common::guess_format_from_extension(path) {
                OutputFormat::Csv => OutputFormat::Png,
                f => f,
            };
            results.sort_by(|a, b| a.redshift.total_cmp(&b.redshift));
            common::write_mass_function(&results, path, format, &args.figure)?;
            output::print_saved("Overlay plot", path);
        }
    }

    output::print_separator();
    output::print_success(&format!(
        "Scan complete ({} redshifts): {} success, {} skipped, {} failed",
        stats.total(),
        stats.success,
        stats.skipped,
        stats.failed
    ));

    if !stats.failures.is_empty() {
        output::print_warning("Failed redshifts:");
        for (label, err) in stats.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", label, err));
        }
        if stats.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", stats.failures.len() - 10));
        }
    }

    Ok(())
}

/// 由参数生成任务列表
fn plan_jobs(args: &ScanArgs) -> Result<Vec<ScanJob>> {
    let ext = args.format.extension();

    if let Some(dir) = &args.spectra_dir {
        let files = FileCollector::new(dir.clone())
            .with_pattern(&args.pattern)?
            .recursive(args.recursive)
            .collect()?;
        if files.is_empty() {
            return Err(HmfError::NoFilesFound {
                pattern: args.pattern.clone(),
            });
        }
        output::print_info(&format!("Found {} spectrum files", files.len()));

        let re = redshift_regex()?;
        let mut jobs = Vec::new();
        for file in files {
            match redshift_from_filename(&re, &file) {
                Some(z) => {
                    let name = flat_stem(&file, dir);
                    jobs.push(ScanJob {
                        redshift: z,
                        output: args.output.join(format!("{}_hmf.{}", name, ext)),
                        spectrum: Some(file),
                    });
                }
                None => output::print_warning(&format!(
                    "No redshift in file name, skipping: {}",
                    file.display()
                )),
            }
        }
        ensure_unique_outputs(&jobs)?;
        return Ok(jobs);
    }

    let redshifts = match (&args.redshifts, &args.range) {
        (Some(list), _) => common::parse_redshift_list(list)?,
        (None, Some(range)) => common::parse_redshift_range(range, args.step)?,
        (None, None) => {
            return Err(HmfError::InvalidArgument(
                "one of --redshifts, --range or --spectra-dir is required".to_string(),
            ))
        }
    };

    let jobs: Vec<ScanJob> = redshifts
        .into_iter()
        .map(|z| ScanJob {
            redshift: z,
            spectrum: None,
            output: args.output.join(format!("hmf_z{}.{}", z, ext)),
        })
        .collect();
    ensure_unique_outputs(&jobs)?;
    Ok(jobs)
}

/// 相对谱目录的路径去掉扩展名，目录分隔符换成 `_`
fn flat_stem(file: &Path, root: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file).with_extension("");
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        "spectrum".to_string()
    } else {
        parts.join("_")
    }
}

/// 两个任务写同一个文件时拒绝执行
fn ensure_unique_outputs(jobs: &[ScanJob]) -> Result<()> {
    let mut seen = HashSet::new();
    for job in jobs {
        if !seen.insert(job.output.as_path()) {
            return Err(HmfError::InvalidArgument(format!(
                "several redshifts map to the same output file: {}",
                job.output.display()
            )));
        }
    }
    Ok(())
}

/// 目录模式：每个文件独立构造宇宙学
fn run_file_job(job: &ScanJob, args: &ScanArgs, config: HmfConfig) -> ScanOutcome {
    finish_job(job, args, || {
        let path = job.spectrum.as_deref().ok_or_else(|| {
            HmfError::InvalidArgument("spectrum file missing from scan job".to_string())
        })?;
        let spectrum = PowerSpectrum::from_csv(path)?;
        let cosmology = common::build_with_spectrum(&args.cosmology, spectrum, job.redshift)?;
        HaloMassFunction::new(&cosmology, config)?.eval_hmf(
            job.redshift,
            !args.hmf.linear,
            args.hmf.volume_element,
        )
    })
}

/// 检查输出、计算并写出单个任务
fn finish_job<F>(job: &ScanJob, args: &ScanArgs, evaluate: F) -> ScanOutcome
where
    F: FnOnce() -> Result<MassFunctionResult>,
{
    let label = job_label(job);

    if job.output.exists() && !args.overwrite {
        return ScanOutcome {
            status: ProcessResult::Skipped(format!(
                "Output exists, skipping: {}",
                job.output.display()
            )),
            result: None,
        };
    }

    let written = evaluate().and_then(|result| {
        write_one(&result, &job.output, args)?;
        Ok(result)
    });

    match written {
        Ok(result) => ScanOutcome {
            status: ProcessResult::Success(format!("{} -> {}", label, job.output.display())),
            result: Some(result),
        },
        Err(e) => {
            log::debug!("scan job {} failed: {}", label, e);
            ScanOutcome {
                status: ProcessResult::Failed(label, e.to_string()),
                result: None,
            }
        }
    }
}

fn write_one(result: &MassFunctionResult, path: &Path, args: &ScanArgs) -> Result<()> {
    common::write_mass_function(std::slice::from_ref(result), path, args.format, &args.figure)
}

fn job_label(job: &ScanJob) -> String {
    match &job.spectrum {
        Some(path) => format!("z = {} ({})", job.redshift, path.display()),
        None => format!("z = {}", job.redshift),
    }
}
