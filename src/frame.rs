// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/frame.rs - 列优先像素栅格定义
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

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
  #[error("栅格尺寸无效: {0}x{1}")]
  EmptyShape(u32, u32),
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

/// 固定尺寸的像素栅格。
///
/// 数据按列优先顺序平铺存放：先是第 0 列的所有行，再是第 1 列，依此类推，
/// 即像素 `(x, y)` 的偏移量为 `x * height + y`。所有按偏移量访问像素的组件
/// （真值掩码、显著图、直方图统计）都依赖同一顺序。
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
  identifier: String,
  width: u32,
  height: u32,
  data: Box<[T]>,
}

/// 真值掩码：每个像素是否属于显著目标
pub type RasterMask = Raster<bool>;

/// 由矩形描述累加得到的概率，可能大于 1.0
pub type ProbabilityGrid = Raster<f32>;

/// 归一化后的显著图灰度值 (0 - 255)
pub type IntensityGrid = Raster<u8>;

fn check_shape(width: u32, height: u32) -> Result<usize, RasterError> {
  if width == 0 || height == 0 {
    return Err(RasterError::EmptyShape(width, height));
  }
  Ok(width as usize * height as usize)
}

impl<T: Clone + Default> Raster<T> {
  pub fn with_shape(
    identifier: impl Into<String>,
    width: u32,
    height: u32,
  ) -> Result<Self, RasterError> {
    let size = check_shape(width, height)?;
    Ok(Self {
      identifier: identifier.into(),
      width,
      height,
      data: vec![T::default(); size].into_boxed_slice(),
    })
  }
}

impl<T> Raster<T> {
  pub fn from_column_major(
    identifier: impl Into<String>,
    width: u32,
    height: u32,
    data: Vec<T>,
  ) -> Result<Self, RasterError> {
    let expected = check_shape(width, height)?;
    if data.len() != expected {
      return Err(RasterError::LengthMismatch {
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      identifier: identifier.into(),
      width,
      height,
      data: data.into_boxed_slice(),
    })
  }

  /// 按列优先顺序逐像素调用 `f(x, y)` 构造栅格
  pub fn from_fn(
    identifier: impl Into<String>,
    width: u32,
    height: u32,
    mut f: impl FnMut(u32, u32) -> T,
  ) -> Result<Self, RasterError> {
    let size = check_shape(width, height)?;
    let mut data = Vec::with_capacity(size);
    for x in 0..width {
      for y in 0..height {
        data.push(f(x, y));
      }
    }

    Ok(Self {
      identifier: identifier.into(),
      width,
      height,
      data: data.into_boxed_slice(),
    })
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

  pub fn dimensions(&self) -> (u32, u32) {
    (self.width, self.height)
  }

  pub fn pixel_count(&self) -> usize {
    self.data.len()
  }

  pub fn offset(&self, x: u32, y: u32) -> usize {
    debug_assert!(x < self.width && y < self.height);
    x as usize * self.height as usize + y as usize
  }

  pub fn get(&self, x: u32, y: u32) -> &T {
    &self.data[self.offset(x, y)]
  }

  pub fn get_mut(&mut self, x: u32, y: u32) -> &mut T {
    let offset = self.offset(x, y);
    &mut self.data[offset]
  }

  pub fn same_shape<U>(&self, other: &Raster<U>) -> bool {
    self.dimensions() == other.dimensions()
  }

  /// 保持尺寸与标识，逐像素映射为另一种栅格
  pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Raster<U> {
    Raster {
      identifier: self.identifier.clone(),
      width: self.width,
      height: self.height,
      data: self.data.iter().map(f).collect(),
    }
  }
}

impl RasterMask {
  pub fn count_salient(&self) -> usize {
    self.data.iter().filter(|&&salient| salient).count()
  }
}

impl<T> AsRef<[T]> for Raster<T> {
  fn as_ref(&self) -> &[T] {
    &self.data
  }
}
