// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/args.rs - 命令行参数
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// 显著图精确率/召回率评估工具
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// 以 256 个灰度阈值评估显著图并输出结果文件
  Evaluate(EvaluateArgs),
  /// 复制相对目标尺寸小于阈值的真值掩码图像
  CopySmallGroundTruth(CopySmallGroundTruthArgs),
  /// 按名称目录中的文件名从图像目录（含子目录）复制同名文件
  CopyImages(CopyImagesArgs),
}

#[derive(clap::Args, Debug)]
pub struct EvaluateArgs {
  /// 真值来源
  /// 支持格式:
  /// - 掩码图像目录: masks:///path/to/dir 或目录路径
  /// - 矩形描述文件: rects:///path/to/file.txt 或文件路径
  #[arg(long, value_name = "SOURCE")]
  pub ground_truth: String,

  /// 显著图目录: maps:///path/to/dir 或目录路径
  #[arg(long, value_name = "DIR")]
  pub saliency: String,

  /// 结果目录: folder:///path/to/dir 或目录路径，缺省时只输出日志
  #[arg(long, value_name = "OUTPUT")]
  pub output: Option<String>,

  /// 矩形描述真值的二值化阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = 0.5, value_name = "THRESHOLD")]
  pub threshold_gt: f64,

  /// 将二值化后的矩形描述真值保存为 PNG
  #[arg(long)]
  pub save_ground_truth: bool,

  /// F 值中召回率相对精确率的权重
  #[arg(long, default_value_t = 1.0, value_name = "BETA")]
  pub beta: f64,

  /// 工作线程数，缺省时按 CPU 核数
  #[arg(long, value_name = "JOBS")]
  pub jobs: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct CopySmallGroundTruthArgs {
  /// 真值掩码图像目录
  #[arg(long, value_name = "DIR")]
  pub ground_truth: PathBuf,

  /// 目标目录
  #[arg(long, value_name = "DIR")]
  pub output: PathBuf,

  /// 相对目标尺寸阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = 0.5, value_name = "THRESHOLD")]
  pub threshold_size: f64,
}

#[derive(clap::Args, Debug)]
pub struct CopyImagesArgs {
  /// 待复制图像所在目录
  #[arg(long, value_name = "DIR")]
  pub images: PathBuf,

  /// 其中文件名（去掉扩展名）决定复制哪些图像
  #[arg(long, value_name = "DIR")]
  pub names: PathBuf,

  /// 目标目录
  #[arg(long, value_name = "DIR")]
  pub output: PathBuf,
}
