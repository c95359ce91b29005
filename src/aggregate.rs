// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/aggregate.rs - 语料级统计
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

use crate::evaluate::{EvaluationTable, NUM_GREYSCALES, PrecisionRecall};

/// 带权 F 值：`((1 + β²)·P·R) / (β²·P + R)`。
///
/// 定义见 N. Chinchor, *MUC-4 Evaluation Metrics*, 1992。分母为零时返回 0。
pub fn f_measure(precision: f64, recall: f64, beta: f64) -> f64 {
  let beta2 = beta * beta;
  let denominator = beta2 * precision + recall;
  if denominator == 0.0 {
    return 0.0;
  }
  (1.0 + beta2) * precision * recall / denominator
}

/// 精确率与召回率的调和平均
pub fn f1_measure(precision: f64, recall: f64) -> f64 {
  f_measure(precision, recall, 1.0)
}

impl PrecisionRecall {
  pub fn f_measure(&self, beta: f64) -> f64 {
    f_measure(self.precision, self.recall, beta)
  }
}

/// 累加各图像的评估结果。
///
/// 没有结果表的图像既不计入分子也不计入分母；相对尺寸同理。
#[derive(Debug, Clone)]
pub struct CorpusAggregator {
  precision_sums: [f64; NUM_GREYSCALES],
  recall_sums: [f64; NUM_GREYSCALES],
  tables: usize,
  size_sum: f64,
  sizes: usize,
  images: usize,
}

impl Default for CorpusAggregator {
  fn default() -> Self {
    Self {
      precision_sums: [0.0; NUM_GREYSCALES],
      recall_sums: [0.0; NUM_GREYSCALES],
      tables: 0,
      size_sum: 0.0,
      sizes: 0,
      images: 0,
    }
  }
}

impl CorpusAggregator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, table: Option<&EvaluationTable>, relative_size: Option<f64>) {
    self.images += 1;

    if let Some(table) = table {
      for (threshold, entry) in table.entries().iter().enumerate() {
        self.precision_sums[threshold] += entry.precision;
        self.recall_sums[threshold] += entry.recall;
      }
      self.tables += 1;
    }

    if let Some(size) = relative_size {
      self.size_sum += size;
      self.sizes += 1;
    }
  }

  pub fn images(&self) -> usize {
    self.images
  }

  pub fn summary(&self) -> CorpusSummary {
    let mean = |sum: f64, count: usize| {
      if count == 0 { 0.0 } else { sum / count as f64 }
    };

    CorpusSummary {
      mean_precision: self.precision_sums.map(|sum| mean(sum, self.tables)),
      mean_recall: self.recall_sums.map(|sum| mean(sum, self.tables)),
      mean_relative_object_size: mean(self.size_sum, self.sizes),
      images: self.images,
      evaluated_images: self.tables,
      sized_images: self.sizes,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorpusSummary {
  pub mean_precision: [f64; NUM_GREYSCALES],
  pub mean_recall: [f64; NUM_GREYSCALES],
  pub mean_relative_object_size: f64,
  /// 提交给聚合器的图像总数（含被跳过的）
  pub images: usize,
  /// 产生了结果表的图像数
  pub evaluated_images: usize,
  pub sized_images: usize,
}

impl CorpusSummary {
  pub fn mean(&self, threshold: u8) -> PrecisionRecall {
    PrecisionRecall {
      precision: self.mean_precision[threshold as usize],
      recall: self.mean_recall[threshold as usize],
    }
  }

  pub fn f_measure_curve(&self, beta: f64) -> Vec<f64> {
    (0..NUM_GREYSCALES)
      .map(|threshold| f_measure(self.mean_precision[threshold], self.mean_recall[threshold], beta))
      .collect()
  }

  /// 平均 F 值最高的阈值，并列时取较小的阈值
  pub fn best_threshold(&self, beta: f64) -> (u8, f64) {
    self
      .f_measure_curve(beta)
      .into_iter()
      .enumerate()
      .fold((0u8, f64::MIN), |best, (threshold, value)| {
        if value > best.1 {
          (threshold as u8, value)
        } else {
          best
        }
      })
  }
}
