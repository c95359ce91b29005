// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/output/log_report.rs - 仅输出到日志
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::convert::Infallible;

use tracing::{debug, info};

use crate::{ground_truth::GroundTruth, outcome::CorpusReport, output::Report};

/// 不写任何文件，只在日志中给出汇总
#[derive(Debug, Default)]
pub struct LogReport;

impl LogReport {
  pub const SCHEME: &'static str = "log";
}

impl Report for LogReport {
  type Error = Infallible;

  fn save_ground_truth(&self, ground_truth: &GroundTruth) -> Result<(), Self::Error> {
    debug!("未指定结果目录，不保存真值 {}", ground_truth.identifier());
    Ok(())
  }

  fn write_report(&self, report: &CorpusReport) -> Result<(), Self::Error> {
    let summary = &report.summary;
    let (threshold, f_measure) = summary.best_threshold(report.beta);
    let best = summary.mean(threshold);
    info!(
      "共 {} 幅图像，已评估 {} 幅",
      summary.images, summary.evaluated_images
    );
    info!(
      "最佳阈值 {}: 精确率 {:.4}, 召回率 {:.4}, F 值 (beta = {}) {:.4}",
      threshold, best.precision, best.recall, report.beta, f_measure
    );
    Ok(())
  }
}
