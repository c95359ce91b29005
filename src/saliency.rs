// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/saliency.rs - 显著图加载与归一化
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

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageReader, imageops::FilterType};
use thiserror::Error;
use tracing::debug;

use crate::{
  frame::{IntensityGrid, RasterError},
  identifier_of,
};

#[derive(Error, Debug)]
pub enum SaliencyMapError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像加载错误: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("栅格错误: {0}")]
  RasterError(#[from] RasterError),
}

/// 将任意显著图转换为与真值尺寸一致的灰度栅格。
///
/// 非灰度图先转为 8 位亮度；尺寸不一致时用双三次插值缩放，
/// 尺寸一致时不做任何缩放。
#[derive(Debug, Clone, Copy)]
pub struct SaliencyNormalizer {
  filter: FilterType,
}

impl Default for SaliencyNormalizer {
  fn default() -> Self {
    Self {
      filter: FilterType::CatmullRom,
    }
  }
}

impl SaliencyNormalizer {
  pub fn normalize(
    &self,
    image: DynamicImage,
    identifier: impl Into<String>,
    width: u32,
    height: u32,
  ) -> Result<IntensityGrid, SaliencyMapError> {
    if width == 0 || height == 0 {
      return Err(RasterError::EmptyShape(width, height).into());
    }

    let grey: GrayImage = match image {
      DynamicImage::ImageLuma8(grey) => grey,
      other => other.to_luma8(),
    };

    let grey = if grey.dimensions() != (width, height) {
      debug!(
        "缩放显著图: {}x{} -> {}x{}",
        grey.width(),
        grey.height(),
        width,
        height
      );
      image::imageops::resize(&grey, width, height, self.filter)
    } else {
      grey
    };

    Ok(IntensityGrid::from_fn(identifier, width, height, |x, y| {
      grey.get_pixel(x, y)[0]
    })?)
  }

  /// 从文件加载显著图并归一化到 `width`x`height`
  pub fn load(
    &self,
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
  ) -> Result<IntensityGrid, SaliencyMapError> {
    let path = path.as_ref();
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let name = path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_default();
    self.normalize(image, identifier_of(&name), width, height)
  }
}
