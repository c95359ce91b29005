// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/output/directory_report.rs - 结果目录输出
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

use std::{
  fs::File,
  io::{BufWriter, Write},
  path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
  FromUrl, FromUrlWithScheme,
  ground_truth::GroundTruth,
  outcome::CorpusReport,
  output::{
    Report,
    result_files::{
      GROUND_TRUTH_SIZES_FILE, RESULT_ALL_FILE, RESULT_MEAN_FILE, write_all_results,
      write_ground_truth_sizes, write_mean_results,
    },
  },
  url_to_path,
};

pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Error, Debug)]
pub enum DirectoryReportError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("结果路径不是目录: {0}")]
  NotADirectory(PathBuf),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 将评估结果写入一个目录：文本结果、`summary.json` 与曲线图，
/// 二值化的真值以 `<标识>.png` 保存在同一目录下
pub struct DirectoryReport {
  directory: PathBuf,
}

impl FromUrlWithScheme for DirectoryReport {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryReport {
  type Error = DirectoryReportError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(DirectoryReportError::SchemeMismatch);
    }

    Self::new(url_to_path(url))
  }
}

impl DirectoryReport {
  /// 目录不存在时创建
  pub fn new(directory: impl AsRef<Path>) -> Result<Self, DirectoryReportError> {
    let directory = directory.as_ref().to_path_buf();
    if directory.exists() && !directory.is_dir() {
      return Err(DirectoryReportError::NotADirectory(directory));
    }
    if !directory.exists() {
      info!("创建结果目录: {}", directory.display());
      std::fs::create_dir_all(&directory)?;
    }

    Ok(Self { directory })
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }

  fn write_text(
    &self,
    name: &str,
    write: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
  ) -> Result<(), DirectoryReportError> {
    let path = self.directory.join(name);
    info!("保存结果文件: {}", path.display());
    let mut writer = BufWriter::new(File::create(&path)?);
    write(&mut writer)?;
    writer.flush()?;
    Ok(())
  }

  fn write_summary(
    &self,
    report: &CorpusReport,
    generated: &DateTime<Utc>,
  ) -> Result<(), DirectoryReportError> {
    let summary = &report.summary;
    let (best_threshold, best_f_measure) = summary.best_threshold(report.beta);
    let best = summary.mean(best_threshold);
    let f_measures = summary.f_measure_curve(report.beta);

    let skipped = report
      .skipped()
      .map(|outcome| {
        json!({
          "index": outcome.index,
          "identifier": outcome.identifier,
          "reason": outcome.skip_reason().map(ToString::to_string),
        })
      })
      .collect::<Vec<_>>();
    let mean = (0..=u8::MAX)
      .map(|threshold| {
        let mean = summary.mean(threshold);
        json!({
          "threshold": threshold,
          "precision": mean.precision,
          "recall": mean.recall,
          "f_measure": f_measures[threshold as usize],
        })
      })
      .collect::<Vec<_>>();

    let value = json!({
      "generated": generated.to_rfc3339(),
      "images": summary.images,
      "evaluated_images": summary.evaluated_images,
      "skipped_images": summary.images - summary.evaluated_images,
      "sized_images": summary.sized_images,
      "mean_relative_object_size": summary.mean_relative_object_size,
      "beta": report.beta,
      "best_threshold": {
        "threshold": best_threshold,
        "f_measure": best_f_measure,
        "precision": best.precision,
        "recall": best.recall,
      },
      "skipped": skipped,
      "mean": mean,
    });

    let path = self.directory.join(SUMMARY_FILE);
    info!("保存汇总文件: {}", path.display());
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(writer, &value)?;
    Ok(())
  }

  #[cfg(feature = "plot")]
  fn write_plots(&self, report: &CorpusReport) -> Result<(), DirectoryReportError> {
    use crate::output::plot::{PLOT_ALL_FILE, PLOT_FILE, all_points, mean_curve};

    info!("绘制精确率/召回率曲线");
    mean_curve(&report.summary, report.beta).save(self.directory.join(PLOT_FILE))?;
    all_points(report).save(self.directory.join(PLOT_ALL_FILE))?;
    Ok(())
  }

  #[cfg(not(feature = "plot"))]
  fn write_plots(&self, _report: &CorpusReport) -> Result<(), DirectoryReportError> {
    debug!("未启用 plot 特性，跳过绘图");
    Ok(())
  }
}

impl Report for DirectoryReport {
  type Error = DirectoryReportError;

  fn save_ground_truth(&self, ground_truth: &GroundTruth) -> Result<(), Self::Error> {
    let Some(image) = ground_truth.to_image() else {
      warn!("真值 {} 没有二值掩码，无法保存", ground_truth.identifier());
      return Ok(());
    };

    let path = self
      .directory
      .join(format!("{}.png", ground_truth.identifier()));
    debug!("保存真值图像: {}", path.display());
    image.save(&path)?;
    Ok(())
  }

  fn write_report(&self, report: &CorpusReport) -> Result<(), Self::Error> {
    let generated = Utc::now();

    self.write_text(RESULT_ALL_FILE, |writer| {
      write_all_results(writer, report, &generated)
    })?;
    self.write_text(GROUND_TRUTH_SIZES_FILE, |writer| {
      write_ground_truth_sizes(writer, report, &generated)
    })?;
    self.write_text(RESULT_MEAN_FILE, |writer| {
      write_mean_results(writer, &report.summary, &generated)
    })?;
    self.write_summary(report, &generated)?;
    self.write_plots(report)?;

    Ok(())
  }
}
