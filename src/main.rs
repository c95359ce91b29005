// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use xianzhu::{
  config::{EvaluateConfig, check_unit_interval},
  copy::{copy_defined_files, copy_small_ground_truth},
  input::{CorpusInput, SaliencyDirectory},
  output::ReportWrapper,
  task::{EvaluateTask, Task},
};

use args::{Args, Command, CopyImagesArgs, CopySmallGroundTruthArgs, EvaluateArgs};

fn evaluate(args: EvaluateArgs) -> Result<()> {
  info!("真值来源: {}", args.ground_truth);
  info!("显著图目录: {}", args.saliency);
  info!(
    "结果输出: {}",
    args.output.as_deref().unwrap_or("(仅日志)")
  );

  let saliency = SaliencyDirectory::parse(&args.saliency)?;
  let config = EvaluateConfig {
    saliency_directory: saliency.directory().to_path_buf(),
    threshold_gt: args.threshold_gt,
    beta: args.beta,
    jobs: args.jobs,
    save_ground_truth: args.save_ground_truth,
  };
  config.validate()?;

  let input = CorpusInput::parse(&args.ground_truth)?;
  let output = ReportWrapper::parse(args.output.as_deref())?;
  if config.save_ground_truth && matches!(output, ReportWrapper::LogReport(_)) {
    warn!("未指定结果目录，--save-ground-truth 不生效");
  }

  let report = EvaluateTask::from_config(&config)
    .interruptible()?
    .run_task(input, saliency, output)?;

  let (threshold, f_measure) = report.summary.best_threshold(config.beta);
  info!(
    "最佳阈值 {}，F 值 {:.4}，跳过 {} 幅图像",
    threshold,
    f_measure,
    report.skipped().count()
  );
  Ok(())
}

fn copy_small(args: CopySmallGroundTruthArgs) -> Result<()> {
  let threshold_size = check_unit_interval("threshold-size", args.threshold_size)?;
  info!(
    "复制相对尺寸小于 {} 的真值: {} -> {}",
    threshold_size,
    args.ground_truth.display(),
    args.output.display()
  );

  let stats = copy_small_ground_truth(&args.ground_truth, &args.output, threshold_size)?;
  if !stats.missing.is_empty() {
    warn!("{} 个文件无法读取", stats.missing.len());
  }
  Ok(())
}

fn copy_images(args: CopyImagesArgs) -> Result<()> {
  info!(
    "按 {} 中的名称复制 {} -> {}",
    args.names.display(),
    args.images.display(),
    args.output.display()
  );

  let stats = copy_defined_files(&args.images, &args.names, &args.output)?;
  if !stats.missing.is_empty() {
    warn!("{} 个名称没有找到对应文件", stats.missing.len());
  }
  Ok(())
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  match args.command {
    Command::Evaluate(args) => evaluate(args),
    Command::CopySmallGroundTruth(args) => copy_small(args),
    Command::CopyImages(args) => copy_images(args),
  }
}
