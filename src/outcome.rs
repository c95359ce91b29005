// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/outcome.rs - 单幅图像的评估结果
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

use thiserror::Error;

use crate::{
  aggregate::{CorpusAggregator, CorpusSummary},
  evaluate::{EvaluateError, EvaluationTable},
  ground_truth::{DescriptionError, GroundTruthError},
  saliency::SaliencyMapError,
};

/// 图像被跳过的原因，跳过的图像不参与统计
#[derive(Error, Debug)]
pub enum SkipReason {
  #[error("真值描述无效: {0}")]
  InvalidDescription(#[from] DescriptionError),
  #[error("无法加载真值: {0}")]
  GroundTruth(#[from] GroundTruthError),
  #[error("未找到对应的显著图")]
  NoSaliencyMap,
  #[error("无法加载显著图: {0}")]
  SaliencyMap(#[from] SaliencyMapError),
  #[error("无法评估: {0}")]
  Evaluate(#[from] EvaluateError),
  #[error("任务已中断")]
  Cancelled,
  #[error("处理过程崩溃: {0}")]
  Panicked(String),
}

#[derive(Debug)]
pub struct ImageOutcome {
  /// 在语料中的位置，从 0 开始
  pub index: usize,
  pub identifier: String,
  /// 找到显著图后记录的真值相对尺寸
  pub relative_size: Option<f64>,
  pub result: Result<EvaluationTable, SkipReason>,
}

impl ImageOutcome {
  pub fn skipped(index: usize, identifier: impl Into<String>, reason: SkipReason) -> Self {
    Self {
      index,
      identifier: identifier.into(),
      relative_size: None,
      result: Err(reason),
    }
  }

  pub fn table(&self) -> Option<&EvaluationTable> {
    self.result.as_ref().ok()
  }

  pub fn skip_reason(&self) -> Option<&SkipReason> {
    self.result.as_ref().err()
  }
}

/// 一次评估运行的全部结果，按语料顺序排列
#[derive(Debug)]
pub struct CorpusReport {
  pub outcomes: Vec<ImageOutcome>,
  pub summary: CorpusSummary,
  pub beta: f64,
}

impl CorpusReport {
  pub fn from_outcomes(outcomes: Vec<ImageOutcome>, beta: f64) -> Self {
    let mut aggregator = CorpusAggregator::new();
    for outcome in &outcomes {
      aggregator.add(outcome.table(), outcome.relative_size);
    }

    Self {
      summary: aggregator.summary(),
      outcomes,
      beta,
    }
  }

  pub fn evaluated(&self) -> impl Iterator<Item = (&str, &EvaluationTable)> {
    self
      .outcomes
      .iter()
      .filter_map(|outcome| Some((outcome.identifier.as_str(), outcome.table()?)))
  }

  pub fn sizes(&self) -> impl Iterator<Item = (&str, f64)> {
    self
      .outcomes
      .iter()
      .filter_map(|outcome| Some((outcome.identifier.as_str(), outcome.relative_size?)))
  }

  pub fn skipped(&self) -> impl Iterator<Item = &ImageOutcome> {
    self
      .outcomes
      .iter()
      .filter(|outcome| outcome.result.is_err())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::evaluate::{NUM_GREYSCALES, PrecisionRecall};

  fn evaluated(index: usize, identifier: &str, precision: f64) -> ImageOutcome {
    ImageOutcome {
      index,
      identifier: identifier.to_string(),
      relative_size: Some(0.25),
      result: Ok(EvaluationTable::from_entries(
        [PrecisionRecall {
          precision,
          recall: 1.0,
        }; NUM_GREYSCALES],
      )),
    }
  }

  #[test]
  fn report_aggregates_only_evaluated_images() {
    let report = CorpusReport::from_outcomes(
      vec![
        evaluated(0, "a", 0.5),
        ImageOutcome::skipped(1, "b", SkipReason::NoSaliencyMap),
        evaluated(2, "c", 1.0),
      ],
      1.0,
    );

    assert_eq!(report.summary.images, 3);
    assert_eq!(report.summary.evaluated_images, 2);
    assert_eq!(report.summary.mean(10).precision, 0.75);
    assert_eq!(
      report.evaluated().map(|(id, _)| id).collect::<Vec<_>>(),
      vec!["a", "c"]
    );
    assert_eq!(report.sizes().count(), 2);
    assert_eq!(report.skipped().count(), 1);
  }
}
