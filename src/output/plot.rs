// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/output/plot.rs - 精确率/召回率曲线绘制
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

use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
  },
  rect::Rect,
};

use crate::{aggregate::CorpusSummary, outcome::CorpusReport};

pub const PLOT_FILE: &str = "plot.png";
pub const PLOT_ALL_FILE: &str = "plot_all.png";

const PLOT_WIDTH: u32 = 800;
const PLOT_HEIGHT: u32 = 600;
const PLOT_MARGIN: u32 = 40;
const GRID_STEPS: u32 = 10;

const BACKGROUND_COLOR: [u8; 3] = [255, 255, 255];
const GRID_COLOR: [u8; 3] = [225, 225, 225];
const AXES_COLOR: [u8; 3] = [0, 0, 0];
const CURVE_COLOR: [u8; 3] = [200, 30, 30];
const POINT_COLOR: [u8; 3] = [30, 60, 200];
const BEST_COLOR: [u8; 3] = [20, 150, 20];

/// 横轴为召回率、纵轴为精确率的画布，两轴范围均为 `[0, 1]`
pub struct PlotCanvas {
  image: RgbImage,
}

impl Default for PlotCanvas {
  fn default() -> Self {
    Self::new()
  }
}

impl PlotCanvas {
  pub fn new() -> Self {
    let mut image = RgbImage::from_pixel(PLOT_WIDTH, PLOT_HEIGHT, Rgb(BACKGROUND_COLOR));

    let (left, top) = (PLOT_MARGIN as f32, PLOT_MARGIN as f32);
    let (right, bottom) = (
      (PLOT_WIDTH - PLOT_MARGIN) as f32,
      (PLOT_HEIGHT - PLOT_MARGIN) as f32,
    );
    for step in 1..GRID_STEPS {
      let ratio = step as f32 / GRID_STEPS as f32;
      let x = left + ratio * (right - left);
      let y = top + ratio * (bottom - top);
      draw_line_segment_mut(&mut image, (x, top), (x, bottom), Rgb(GRID_COLOR));
      draw_line_segment_mut(&mut image, (left, y), (right, y), Rgb(GRID_COLOR));
    }

    // 坐标框加粗为 2 像素
    for thickness in 0..2 {
      let rect = Rect::at(
        PLOT_MARGIN as i32 - thickness,
        PLOT_MARGIN as i32 - thickness,
      )
      .of_size(
        PLOT_WIDTH - 2 * PLOT_MARGIN + 2 * thickness as u32,
        PLOT_HEIGHT - 2 * PLOT_MARGIN + 2 * thickness as u32,
      );
      draw_hollow_rect_mut(&mut image, rect, Rgb(AXES_COLOR));
    }

    Self { image }
  }

  fn to_pixel(&self, recall: f64, precision: f64) -> (f32, f32) {
    let span_x = (PLOT_WIDTH - 2 * PLOT_MARGIN) as f64;
    let span_y = (PLOT_HEIGHT - 2 * PLOT_MARGIN) as f64;
    let x = PLOT_MARGIN as f64 + recall.clamp(0.0, 1.0) * span_x;
    let y = (PLOT_HEIGHT - PLOT_MARGIN) as f64 - precision.clamp(0.0, 1.0) * span_y;
    (x as f32, y as f32)
  }

  /// 依次连接各点，点以 `(recall, precision)` 给出
  pub fn polyline(&mut self, points: impl IntoIterator<Item = (f64, f64)>, color: [u8; 3]) {
    let mut previous: Option<(f32, f32)> = None;
    for (recall, precision) in points {
      let current = self.to_pixel(recall, precision);
      if let Some(previous) = previous {
        draw_line_segment_mut(&mut self.image, previous, current, Rgb(color));
      }
      previous = Some(current);
    }
  }

  pub fn scatter(
    &mut self,
    points: impl IntoIterator<Item = (f64, f64)>,
    color: [u8; 3],
    radius: i32,
  ) {
    for (recall, precision) in points {
      let (x, y) = self.to_pixel(recall, precision);
      let center = (x.round() as i32, y.round() as i32);
      if radius <= 0 {
        let rect = Rect::at(center.0, center.1).of_size(1, 1);
        draw_filled_rect_mut(&mut self.image, rect, Rgb(color));
      } else {
        draw_filled_circle_mut(&mut self.image, center, radius, Rgb(color));
      }
    }
  }

  pub fn into_image(self) -> RgbImage {
    self.image
  }
}

/// 平均精确率/召回率随阈值变化的曲线，并标出 F 值最高的阈值
pub fn mean_curve(summary: &CorpusSummary, beta: f64) -> RgbImage {
  let mut canvas = PlotCanvas::new();
  canvas.polyline(
    (0..=u8::MAX).map(|threshold| {
      let mean = summary.mean(threshold);
      (mean.recall, mean.precision)
    }),
    CURVE_COLOR,
  );

  if summary.evaluated_images > 0 {
    let (threshold, _) = summary.best_threshold(beta);
    let best = summary.mean(threshold);
    canvas.scatter([(best.recall, best.precision)], BEST_COLOR, 4);
  }

  canvas.into_image()
}

/// 每幅图像在每个阈值下的精确率/召回率散点
pub fn all_points(report: &CorpusReport) -> RgbImage {
  let mut canvas = PlotCanvas::new();
  for (_, table) in report.evaluated() {
    canvas.scatter(
      table
        .entries()
        .iter()
        .map(|entry| (entry.recall, entry.precision)),
      POINT_COLOR,
      1,
    );
  }
  canvas.into_image()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::aggregate::CorpusAggregator;

  #[test]
  fn canvas_has_fixed_size_and_frame() {
    let image = PlotCanvas::new().into_image();
    assert_eq!(image.dimensions(), (PLOT_WIDTH, PLOT_HEIGHT));
    assert_eq!(*image.get_pixel(PLOT_MARGIN, PLOT_HEIGHT / 2), Rgb(AXES_COLOR));
    assert_eq!(*image.get_pixel(1, 1), Rgb(BACKGROUND_COLOR));
  }

  #[test]
  fn points_map_to_plot_area_corners() {
    let canvas = PlotCanvas::new();
    assert_eq!(
      canvas.to_pixel(0.0, 0.0),
      (PLOT_MARGIN as f32, (PLOT_HEIGHT - PLOT_MARGIN) as f32)
    );
    assert_eq!(
      canvas.to_pixel(1.0, 1.0),
      ((PLOT_WIDTH - PLOT_MARGIN) as f32, PLOT_MARGIN as f32)
    );
    assert_eq!(canvas.to_pixel(2.0, -1.0), canvas.to_pixel(1.0, 0.0));
  }

  #[test]
  fn empty_summary_still_renders() {
    let summary = CorpusAggregator::new().summary();
    let image = mean_curve(&summary, 1.0);
    assert_eq!(image.dimensions(), (PLOT_WIDTH, PLOT_HEIGHT));
  }
}
