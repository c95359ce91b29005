// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/ground_truth.rs - 显著目标真值
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

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageReader, Luma};
use thiserror::Error;
use tracing::debug;

mod description;
pub use self::description::{DescriptionError, GroundTruthDescription, Rectangle};

use crate::{
  evaluate::{self, EvaluateError, EvaluationTable, PrecisionRecall},
  frame::{IntensityGrid, ProbabilityGrid, RasterError, RasterMask},
  identifier_of,
};

/// 尚无二值掩码时 [`GroundTruth::relative_object_size`] 的返回值
pub const NO_MASK_SIZE: f64 = -1.0;

#[derive(Error, Debug)]
pub enum GroundTruthError {
  #[error("文件不存在: {0}")]
  NotFound(PathBuf),
  #[error("路径是目录而不是文件: {0}")]
  IsDirectory(PathBuf),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像加载错误: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("栅格错误: {0}")]
  RasterError(#[from] RasterError),
}

/// 一幅图像的显著目标真值。
///
/// 真值有两种来源：
/// - 二值掩码图像，所有通道均为最大值（纯白）的像素视为显著；
/// - 矩形描述（见 [`GroundTruthDescription`]），先累加为概率栅格，
///   再通过 [`GroundTruth::set_binary_threshold`] 得到二值掩码。
///
/// 评估方法参见 R. Achanta, S. Hemami, F. Estrada, S. Süsstrunk,
/// *Frequency-tuned Salient Region Detection*, CVPR 2009。
#[derive(Debug, Clone)]
pub struct GroundTruth {
  identifier: String,
  width: u32,
  height: u32,
  probabilities: Option<ProbabilityGrid>,
  mask: Option<RasterMask>,
}

impl GroundTruth {
  pub fn from_mask(mask: RasterMask) -> Self {
    Self {
      identifier: mask.identifier().to_string(),
      width: mask.width(),
      height: mask.height(),
      probabilities: None,
      mask: Some(mask),
    }
  }

  pub fn from_image(
    image: &DynamicImage,
    identifier: impl Into<String>,
  ) -> Result<Self, GroundTruthError> {
    // 统一到 16 位 RGBA，8 位的 255 恰好映射为 65535
    let rgba = image.to_rgba16();
    let mask = RasterMask::from_fn(identifier, rgba.width(), rgba.height(), |x, y| {
      rgba.get_pixel(x, y).0.iter().all(|&channel| channel == u16::MAX)
    })?;
    Ok(Self::from_mask(mask))
  }

  /// 从二值掩码图像文件加载，标识为去掉扩展名的文件名
  pub fn open(path: impl AsRef<Path>) -> Result<Self, GroundTruthError> {
    let path = path.as_ref();
    if !path.exists() {
      return Err(GroundTruthError::NotFound(path.to_path_buf()));
    }
    if path.is_dir() {
      return Err(GroundTruthError::IsDirectory(path.to_path_buf()));
    }

    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let name = path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_default();
    debug!(
      "加载真值图像: {} ({}x{})",
      path.display(),
      image.width(),
      image.height()
    );
    Self::from_image(&image, identifier_of(&name))
  }

  /// 由矩形描述构造，此时还没有二值掩码，需要调用 [`Self::set_binary_threshold`]
  pub fn from_description(
    description: &GroundTruthDescription,
  ) -> Result<Self, GroundTruthError> {
    let probabilities = description.probability_grid()?;
    Ok(Self {
      identifier: description.identifier().to_string(),
      width: description.width(),
      height: description.height(),
      probabilities: Some(probabilities),
      mask: None,
    })
  }

  /// 由概率栅格重新计算二值掩码：概率严格大于阈值的像素为显著。
  ///
  /// 阈值被限制在 `[0, 1]` 内。对由掩码图像构造的真值无效果。
  pub fn set_binary_threshold(&mut self, threshold: f64) {
    let Some(probabilities) = &self.probabilities else {
      return;
    };

    let threshold = threshold.clamp(0.0, 1.0);
    self.mask = Some(probabilities.map(|&p| f64::from(p) > threshold));
  }

  pub fn identifier(&self) -> &str {
    &self.identifier
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn mask(&self) -> Option<&RasterMask> {
    self.mask.as_ref()
  }

  pub fn probabilities(&self) -> Option<&ProbabilityGrid> {
    self.probabilities.as_ref()
  }

  /// 显著像素占全部像素的比例；没有掩码时返回 [`NO_MASK_SIZE`]
  pub fn relative_object_size(&self) -> f64 {
    match &self.mask {
      Some(mask) => mask.count_salient() as f64 / mask.pixel_count() as f64,
      None => NO_MASK_SIZE,
    }
  }

  /// 计算所有 256 个灰度阈值下的精确率/召回率
  pub fn evaluate(&self, saliency: &IntensityGrid) -> Result<EvaluationTable, EvaluateError> {
    let mask = self.mask.as_ref().ok_or(EvaluateError::MaskUnavailable)?;
    evaluate::sweep(mask, saliency)
  }

  /// 计算单个灰度阈值下的精确率/召回率
  pub fn evaluate_at(
    &self,
    saliency: &IntensityGrid,
    threshold: u8,
  ) -> Result<PrecisionRecall, EvaluateError> {
    let mask = self.mask.as_ref().ok_or(EvaluateError::MaskUnavailable)?;
    evaluate::evaluate_at(mask, saliency, threshold)
  }

  /// 将当前二值掩码渲染为黑白图像
  pub fn to_image(&self) -> Option<GrayImage> {
    let mask = self.mask.as_ref()?;
    Some(GrayImage::from_fn(self.width, self.height, |x, y| {
      if *mask.get(x, y) {
        Luma([u8::MAX])
      } else {
        Luma([0])
      }
    }))
  }
}
