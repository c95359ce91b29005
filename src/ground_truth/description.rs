// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/ground_truth/description.rs - 矩形真值描述解析
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

//! # 矩形真值描述
//!
//! 每条记录占三行逻辑行，记录之间以空行分隔：
//!
//! ```text
//! images/0/0_1_1234.jpg
//! 400 300
//! 12 30 210 280; 150 40 390 290
//! ```
//!
//! 第一行是图像路径，第二行是 `宽 高`，第三行是以分号分隔的
//! `left top right bottom` 矩形（坐标包含边界，宽度为 `right - left + 1`）。

use std::str::FromStr;

use thiserror::Error;

use crate::{
  frame::{ProbabilityGrid, RasterError},
  identifier_of,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptionError {
  #[error("缺少字段: {0}")]
  MissingField(&'static str),
  #[error("无法解析字段 {field} 的数值 '{value}'")]
  InvalidNumber { field: &'static str, value: String },
  #[error("图像尺寸无效: {0}x{1}")]
  InvalidSize(i32, i32),
}

/// 像素坐标下的矩形，`x`/`y` 为左上角。
///
/// 记录中的坐标为 32 位整数，字段取 64 位以容纳宽高与右下角的运算。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
  pub x: i64,
  pub y: i64,
  pub width: i64,
  pub height: i64,
}

impl Rectangle {
  /// 由包含边界的 `left top right bottom` 坐标构造
  pub fn from_corners(left: i32, top: i32, right: i32, bottom: i32) -> Self {
    let (left, top) = (i64::from(left), i64::from(top));
    Self {
      x: left,
      y: top,
      width: i64::from(right) - left + 1,
      height: i64::from(bottom) - top + 1,
    }
  }

  /// 裁剪到图像范围内，完全落在图像外的矩形返回 `None`
  pub fn clip(&self, image_width: u32, image_height: u32) -> Option<Rectangle> {
    let left = self.x.max(0);
    let top = self.y.max(0);
    let right = (self.x + self.width).min(image_width as i64);
    let bottom = (self.y + self.height).min(image_height as i64);

    if right <= left || bottom <= top {
      return None;
    }

    Some(Rectangle {
      x: left,
      y: top,
      width: right - left,
      height: bottom - top,
    })
  }
}

/// 一条解析成功的真值描述，构造后不再修改
#[derive(Debug, Clone, PartialEq)]
pub struct GroundTruthDescription {
  image_path: String,
  identifier: String,
  width: u32,
  height: u32,
  rectangles: Vec<Rectangle>,
}

fn parse_number<T: FromStr>(
  tokens: &mut std::str::SplitWhitespace<'_>,
  field: &'static str,
) -> Result<T, DescriptionError> {
  let token = tokens
    .next()
    .ok_or(DescriptionError::MissingField(field))?;
  token
    .parse()
    .map_err(|_| DescriptionError::InvalidNumber {
      field,
      value: token.to_string(),
    })
}

impl FromStr for GroundTruthDescription {
  type Err = DescriptionError;

  fn from_str(record: &str) -> Result<Self, Self::Err> {
    let mut lines = record
      .trim()
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty());

    let image_path = lines
      .next()
      .ok_or(DescriptionError::MissingField("image path"))?
      .to_string();

    let size_line = lines
      .next()
      .ok_or(DescriptionError::MissingField("image size"))?;
    let mut size_tokens = size_line.split_whitespace();
    let width: i32 = parse_number(&mut size_tokens, "image width")?;
    let height: i32 = parse_number(&mut size_tokens, "image height")?;
    if width <= 0 || height <= 0 {
      return Err(DescriptionError::InvalidSize(width, height));
    }

    let rect_line = lines
      .next()
      .ok_or(DescriptionError::MissingField("rectangles"))?;
    let mut rectangles = Vec::new();
    for rect in rect_line.split(';').filter(|rect| !rect.trim().is_empty()) {
      let mut tokens = rect.split_whitespace();
      let left = parse_number(&mut tokens, "left")?;
      let top = parse_number(&mut tokens, "top")?;
      let right = parse_number(&mut tokens, "right")?;
      let bottom = parse_number(&mut tokens, "bottom")?;
      rectangles.push(Rectangle::from_corners(left, top, right, bottom));
    }

    Ok(GroundTruthDescription {
      identifier: identifier_of(&image_path).to_string(),
      image_path,
      width: width as u32,
      height: height as u32,
      rectangles,
    })
  }
}

impl GroundTruthDescription {
  pub fn image_path(&self) -> &str {
    &self.image_path
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

  pub fn rectangles(&self) -> &[Rectangle] {
    &self.rectangles
  }

  /// 每个矩形对其覆盖的像素贡献 `1/N`，重叠部分直接累加，不做截断。
  pub fn probability_grid(&self) -> Result<ProbabilityGrid, RasterError> {
    let mut grid = ProbabilityGrid::with_shape(&self.identifier, self.width, self.height)?;
    if self.rectangles.is_empty() {
      return Ok(grid);
    }

    let weight = 1.0f32 / self.rectangles.len() as f32;
    for rect in self
      .rectangles
      .iter()
      .filter_map(|rect| rect.clip(self.width, self.height))
    {
      for x in rect.x..rect.x + rect.width {
        for y in rect.y..rect.y + rect.height {
          *grid.get_mut(x as u32, y as u32) += weight;
        }
      }
    }

    Ok(grid)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_three_line_record() {
    let description: GroundTruthDescription = "images/0/dog01.jpg\n400 300\n10 20 109 219; 0 0 0 0"
      .parse()
      .unwrap();
    assert_eq!(description.identifier(), "dog01");
    assert_eq!(description.image_path(), "images/0/dog01.jpg");
    assert_eq!((description.width(), description.height()), (400, 300));
    assert_eq!(
      description.rectangles(),
      &[
        Rectangle {
          x: 10,
          y: 20,
          width: 100,
          height: 200
        },
        Rectangle {
          x: 0,
          y: 0,
          width: 1,
          height: 1
        },
      ]
    );
  }

  #[test]
  fn tolerates_crlf_and_extra_spaces() {
    let description: GroundTruthDescription = "  a.png\r\n 4   3 \r\n0 0  1 1 ;\r\n"
      .parse()
      .unwrap();
    assert_eq!(description.rectangles().len(), 1);
  }

  #[test]
  fn missing_rectangle_line_is_invalid() {
    let result = "a.png\n4 3".parse::<GroundTruthDescription>();
    assert_eq!(result, Err(DescriptionError::MissingField("rectangles")));
  }

  #[test]
  fn non_numeric_field_is_invalid() {
    let result = "a.png\n4 x\n0 0 1 1".parse::<GroundTruthDescription>();
    assert_eq!(
      result,
      Err(DescriptionError::InvalidNumber {
        field: "image height",
        value: "x".to_string()
      })
    );

    let result = "a.png\n4 3\n0 0 1".parse::<GroundTruthDescription>();
    assert_eq!(result, Err(DescriptionError::MissingField("bottom")));
  }

  #[test]
  fn zero_size_is_invalid() {
    let result = "a.png\n0 3\n0 0 1 1".parse::<GroundTruthDescription>();
    assert_eq!(result, Err(DescriptionError::InvalidSize(0, 3)));
  }

  #[test]
  fn clipping_keeps_rectangles_inside_image() {
    let rect = Rectangle::from_corners(8, -2, 20, 3);
    assert_eq!(
      rect.clip(10, 10),
      Some(Rectangle {
        x: 8,
        y: 0,
        width: 2,
        height: 4
      })
    );
    assert_eq!(Rectangle::from_corners(12, 0, 20, 3).clip(10, 10), None);
    assert_eq!(Rectangle::from_corners(5, 5, 4, 9).clip(10, 10), None);
  }

  #[test]
  fn overlapping_rectangles_accumulate() {
    let description: GroundTruthDescription =
      "a.png\n4 4\n0 0 1 1; 1 1 3 3".parse().unwrap();
    let grid = description.probability_grid().unwrap();
    assert_eq!(*grid.get(0, 0), 0.5);
    assert_eq!(*grid.get(1, 1), 1.0);
    assert_eq!(*grid.get(3, 3), 0.5);
    assert_eq!(*grid.get(3, 0), 0.0);
  }

  #[test]
  fn outside_rectangle_contributes_nothing() {
    let description: GroundTruthDescription =
      "a.png\n4 4\n0 0 3 3; 10 10 20 20".parse().unwrap();
    let grid = description.probability_grid().unwrap();
    assert!(grid.as_ref().iter().all(|&p| p == 0.5));
  }

  #[test]
  fn out_of_range_coordinates_are_invalid() {
    let result = "big.jpg\n4 4\n0 0 9223372036854775807 1".parse::<GroundTruthDescription>();
    assert_eq!(
      result,
      Err(DescriptionError::InvalidNumber {
        field: "right",
        value: "9223372036854775807".to_string()
      })
    );

    let result = "wide.jpg\n4294967296 4\n0 0 1 1".parse::<GroundTruthDescription>();
    assert!(matches!(
      result,
      Err(DescriptionError::InvalidNumber { field: "image width", .. })
    ));
  }

  #[test]
  fn extreme_coordinates_clip_without_overflow() {
    let rect = Rectangle::from_corners(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
    assert_eq!(rect.width, 1i64 << 32);
    assert_eq!(
      rect.clip(3, 2),
      Some(Rectangle {
        x: 0,
        y: 0,
        width: 3,
        height: 2
      })
    );
  }
}
