// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/evaluate.rs - 全阈值精确率/召回率扫描
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

//! # 混淆矩阵扫描
//!
//! 对每个灰度阈值 `t`，显著图中灰度 `>= t` 的像素视为预测为显著。
//! 逐阈值重新遍历像素需要 `O(256·W·H)`；这里先对真值为显著/非显著的像素
//! 各建一张 256 格直方图，再从 255 向 0 累加，总代价为 `O(W·H + 256)`，
//! 结果与逐阈值计算逐位相同。
//!
//! 分母为零时（没有预测为显著的像素，或真值中没有显著像素）结果记为 0。

use thiserror::Error;

use crate::frame::{IntensityGrid, RasterMask};

/// 灰度级数，也是阈值个数
pub const NUM_GREYSCALES: usize = 256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluateError {
  #[error("尺寸不匹配: 真值 {truth_width}x{truth_height}, 显著图 {map_width}x{map_height}")]
  DimensionMismatch {
    truth_width: u32,
    truth_height: u32,
    map_width: u32,
    map_height: u32,
  },
  #[error("真值掩码不可用")]
  MaskUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PrecisionRecall {
  pub precision: f64,
  pub recall: f64,
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
  if denominator == 0 {
    0.0
  } else {
    numerator as f64 / denominator as f64
  }
}

/// 某一阈值下的像素计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Confusion {
  pub true_positive: u64,
  pub false_positive: u64,
  /// 真值中显著像素总数，与阈值无关
  pub positive: u64,
}

impl Confusion {
  pub fn predicted_positive(&self) -> u64 {
    self.true_positive + self.false_positive
  }

  pub fn precision(&self) -> f64 {
    ratio(self.true_positive, self.predicted_positive())
  }

  pub fn recall(&self) -> f64 {
    ratio(self.true_positive, self.positive)
  }

  pub fn precision_recall(&self) -> PrecisionRecall {
    PrecisionRecall {
      precision: self.precision(),
      recall: self.recall(),
    }
  }
}

/// 单幅图像在每个阈值下的精确率/召回率，下标即阈值
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationTable {
  entries: [PrecisionRecall; NUM_GREYSCALES],
}

impl EvaluationTable {
  pub fn from_entries(entries: [PrecisionRecall; NUM_GREYSCALES]) -> Self {
    Self { entries }
  }

  pub fn get(&self, threshold: u8) -> PrecisionRecall {
    self.entries[threshold as usize]
  }

  pub fn precision(&self, threshold: u8) -> f64 {
    self.get(threshold).precision
  }

  pub fn recall(&self, threshold: u8) -> f64 {
    self.get(threshold).recall
  }

  pub fn entries(&self) -> &[PrecisionRecall; NUM_GREYSCALES] {
    &self.entries
  }
}

struct Histograms {
  positive: [u64; NUM_GREYSCALES],
  negative: [u64; NUM_GREYSCALES],
}

impl Histograms {
  fn collect(mask: &RasterMask, saliency: &IntensityGrid) -> Self {
    let mut histograms = Histograms {
      positive: [0; NUM_GREYSCALES],
      negative: [0; NUM_GREYSCALES],
    };

    for (&salient, &value) in mask.as_ref().iter().zip(saliency.as_ref()) {
      if salient {
        histograms.positive[value as usize] += 1;
      } else {
        histograms.negative[value as usize] += 1;
      }
    }

    histograms
  }
}

fn check_dimensions(mask: &RasterMask, saliency: &IntensityGrid) -> Result<(), EvaluateError> {
  if mask.same_shape(saliency) {
    return Ok(());
  }

  Err(EvaluateError::DimensionMismatch {
    truth_width: mask.width(),
    truth_height: mask.height(),
    map_width: saliency.width(),
    map_height: saliency.height(),
  })
}

/// 一次遍历得到所有阈值下的计数，`TP`/`FP` 随阈值增大单调不增
pub fn confusion_counts(
  mask: &RasterMask,
  saliency: &IntensityGrid,
) -> Result<[Confusion; NUM_GREYSCALES], EvaluateError> {
  check_dimensions(mask, saliency)?;

  let histograms = Histograms::collect(mask, saliency);
  let mut running = Confusion {
    positive: histograms.positive.iter().sum(),
    ..Confusion::default()
  };

  let mut counts = [Confusion::default(); NUM_GREYSCALES];
  for threshold in (0..NUM_GREYSCALES).rev() {
    running.true_positive += histograms.positive[threshold];
    running.false_positive += histograms.negative[threshold];
    counts[threshold] = running;
  }

  Ok(counts)
}

pub fn sweep(
  mask: &RasterMask,
  saliency: &IntensityGrid,
) -> Result<EvaluationTable, EvaluateError> {
  let counts = confusion_counts(mask, saliency)?;
  Ok(EvaluationTable::from_entries(
    counts.map(|confusion| confusion.precision_recall()),
  ))
}

/// 单一阈值下的精确率/召回率，分母为零时同样记为 0
pub fn evaluate_at(
  mask: &RasterMask,
  saliency: &IntensityGrid,
  threshold: u8,
) -> Result<PrecisionRecall, EvaluateError> {
  check_dimensions(mask, saliency)?;

  let mut confusion = Confusion::default();
  for (&salient, &value) in mask.as_ref().iter().zip(saliency.as_ref()) {
    let predicted = value >= threshold;
    if salient {
      confusion.positive += 1;
      if predicted {
        confusion.true_positive += 1;
      }
    } else if predicted {
      confusion.false_positive += 1;
    }
  }

  Ok(confusion.precision_recall())
}

#[cfg(test)]
mod tests {
  use super::*;

  /// 逐阈值重新遍历的参考实现
  fn naive(mask: &RasterMask, saliency: &IntensityGrid) -> Vec<PrecisionRecall> {
    (0..NUM_GREYSCALES)
      .map(|threshold| evaluate_at(mask, saliency, threshold as u8).unwrap())
      .collect()
  }

  /// 简单的线性同余序列，保证测试可复现
  fn pseudo_random(seed: u64) -> impl FnMut() -> u64 {
    let mut state = seed;
    move || {
      state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
      state >> 33
    }
  }

  fn center_example() -> (RasterMask, IntensityGrid) {
    let mask = RasterMask::from_fn("center", 3, 3, |x, y| x == 1 && y == 1).unwrap();
    let grid =
      IntensityGrid::from_fn("center", 3, 3, |x, y| if x == 1 && y == 1 { 200 } else { 0 })
        .unwrap();
    (mask, grid)
  }

  #[test]
  fn center_pixel_example() {
    let (mask, grid) = center_example();
    let table = sweep(&mask, &grid).unwrap();

    assert_eq!(table.precision(100), 1.0);
    assert_eq!(table.recall(100), 1.0);
    assert_eq!(table.precision(0), 1.0 / 9.0);
    assert_eq!(table.recall(0), 1.0);
    assert_eq!(table.precision(201), 0.0);
    assert_eq!(table.recall(201), 0.0);

    let counts = confusion_counts(&mask, &grid).unwrap();
    assert_eq!(
      counts[0],
      Confusion {
        true_positive: 1,
        false_positive: 8,
        positive: 1
      }
    );
  }

  #[test]
  fn single_threshold_matches_sweep() {
    let (mask, grid) = center_example();
    let table = sweep(&mask, &grid).unwrap();
    for threshold in [0u8, 1, 100, 200, 201, 255] {
      assert_eq!(
        evaluate_at(&mask, &grid, threshold).unwrap(),
        table.get(threshold)
      );
    }
  }

  #[test]
  fn histogram_sweep_equals_naive_recomputation() {
    let mut next = pseudo_random(0x5eed);
    for (width, height) in [(1, 1), (7, 3), (16, 16), (31, 9)] {
      for density in [0, 3, 10] {
        let mask =
          RasterMask::from_fn("random", width, height, |_, _| next() % 10 < density).unwrap();
        let grid = IntensityGrid::from_fn("random", width, height, |_, _| (next() % 256) as u8)
          .unwrap();

        let table = sweep(&mask, &grid).unwrap();
        assert_eq!(table.entries().as_slice(), naive(&mask, &grid).as_slice());
      }
    }
  }

  #[test]
  fn counts_are_monotonic() {
    let mut next = pseudo_random(42);
    let mask = RasterMask::from_fn("mono", 20, 15, |_, _| next() % 3 == 0).unwrap();
    let grid = IntensityGrid::from_fn("mono", 20, 15, |_, _| (next() % 256) as u8).unwrap();

    let counts = confusion_counts(&mask, &grid).unwrap();
    let table = sweep(&mask, &grid).unwrap();
    for threshold in 1..NUM_GREYSCALES {
      assert!(counts[threshold].true_positive <= counts[threshold - 1].true_positive);
      assert!(counts[threshold].false_positive <= counts[threshold - 1].false_positive);
      assert!(table.recall(threshold as u8) <= table.recall(threshold as u8 - 1));
    }
    assert_eq!(table.recall(0), 1.0);
  }

  #[test]
  fn top_threshold_counts_saturated_pixels() {
    let mut next = pseudo_random(7);
    let mask = RasterMask::from_fn("top", 12, 12, |_, _| next() % 2 == 0).unwrap();
    let grid = IntensityGrid::from_fn("top", 12, 12, |_, _| {
      if next() % 4 == 0 { 255 } else { 254 }
    })
    .unwrap();

    let saturated = grid.as_ref().iter().filter(|&&value| value == 255).count() as u64;
    let counts = confusion_counts(&mask, &grid).unwrap();
    assert_eq!(counts[255].predicted_positive(), saturated);
  }

  #[test]
  fn empty_ground_truth_has_zero_recall() {
    let mask = RasterMask::with_shape("empty", 4, 4).unwrap();
    let grid = IntensityGrid::from_fn("empty", 4, 4, |x, _| (x * 60) as u8).unwrap();
    let table = sweep(&mask, &grid).unwrap();
    assert!(table.entries().iter().all(|entry| entry.recall == 0.0));
    assert!(table.entries().iter().all(|entry| !entry.precision.is_nan()));
  }

  #[test]
  fn unreached_threshold_has_zero_precision() {
    let mask = RasterMask::from_fn("dim", 4, 4, |x, _| x < 2).unwrap();
    let grid = IntensityGrid::from_fn("dim", 4, 4, |_, _| 99).unwrap();
    let table = sweep(&mask, &grid).unwrap();
    assert_eq!(table.precision(100), 0.0);
    assert_eq!(table.precision(99), 0.5);
    assert_eq!(evaluate_at(&mask, &grid, 100).unwrap().precision, 0.0);
  }

  #[test]
  fn dimension_mismatch_is_reported() {
    let mask = RasterMask::with_shape("small", 3, 3).unwrap();
    let grid = IntensityGrid::with_shape("large", 4, 3).unwrap();
    assert_eq!(
      sweep(&mask, &grid),
      Err(EvaluateError::DimensionMismatch {
        truth_width: 3,
        truth_height: 3,
        map_width: 4,
        map_height: 3
      })
    );
    assert!(evaluate_at(&mask, &grid, 0).is_err());
  }
}
