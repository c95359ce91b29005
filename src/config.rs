// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/config.rs - 运行配置校验
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

use thiserror::Error;

/// 配置错误在任何处理开始之前报告，并终止整个运行
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
  #[error("{name} 必须在 [0.0, 1.0] 范围内，实际为 {value}")]
  OutOfUnitInterval { name: &'static str, value: f64 },
  #[error("{name} 必须为正数，实际为 {value}")]
  NotPositive { name: &'static str, value: f64 },
  #[error("目录不存在: {0}")]
  DirectoryNotFound(PathBuf),
  #[error("路径不是目录: {0}")]
  NotADirectory(PathBuf),
  #[error("工作线程数必须大于 0")]
  NoWorkers,
}

pub fn check_unit_interval(name: &'static str, value: f64) -> Result<f64, ConfigError> {
  if (0.0..=1.0).contains(&value) {
    Ok(value)
  } else {
    Err(ConfigError::OutOfUnitInterval { name, value })
  }
}

pub fn check_positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
  if value > 0.0 && value.is_finite() {
    Ok(value)
  } else {
    Err(ConfigError::NotPositive { name, value })
  }
}

pub fn check_directory(path: &Path) -> Result<(), ConfigError> {
  if !path.exists() {
    return Err(ConfigError::DirectoryNotFound(path.to_path_buf()));
  }
  if !path.is_dir() {
    return Err(ConfigError::NotADirectory(path.to_path_buf()));
  }
  Ok(())
}

/// 评估运行的参数
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluateConfig {
  pub saliency_directory: PathBuf,
  /// 矩形描述真值的二值化阈值
  pub threshold_gt: f64,
  pub beta: f64,
  /// 工作线程数，`None` 表示使用 rayon 全局线程池
  pub jobs: Option<usize>,
  pub save_ground_truth: bool,
}

impl EvaluateConfig {
  pub fn new(saliency_directory: impl Into<PathBuf>) -> Self {
    Self {
      saliency_directory: saliency_directory.into(),
      threshold_gt: 0.5,
      beta: 1.0,
      jobs: None,
      save_ground_truth: false,
    }
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    check_unit_interval("threshold-gt", self.threshold_gt)?;
    check_positive("beta", self.beta)?;
    if self.jobs == Some(0) {
      return Err(ConfigError::NoWorkers);
    }
    check_directory(&self.saliency_directory)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn evaluate_config_is_validated_as_a_whole() {
    let directory = std::env::temp_dir();

    let config = EvaluateConfig::new(&directory);
    assert_eq!(config.validate(), Ok(()));

    let mut config = EvaluateConfig::new(&directory);
    config.threshold_gt = 1.5;
    assert!(matches!(
      config.validate(),
      Err(ConfigError::OutOfUnitInterval { .. })
    ));

    let mut config = EvaluateConfig::new(&directory);
    config.jobs = Some(0);
    assert_eq!(config.validate(), Err(ConfigError::NoWorkers));
  }

  #[test]
  fn unit_interval_bounds_are_inclusive() {
    assert_eq!(check_unit_interval("t", 0.0), Ok(0.0));
    assert_eq!(check_unit_interval("t", 1.0), Ok(1.0));
    assert!(check_unit_interval("t", 1.01).is_err());
    assert!(check_unit_interval("t", f64::NAN).is_err());
  }

  #[test]
  fn beta_must_be_positive() {
    assert!(check_positive("beta", 0.3).is_ok());
    assert!(check_positive("beta", 0.0).is_err());
    assert!(check_positive("beta", f64::INFINITY).is_err());
  }

  #[test]
  fn missing_directory_is_reported() {
    assert_eq!(
      check_directory(Path::new("/definitely/not/here")),
      Err(ConfigError::DirectoryNotFound(PathBuf::from(
        "/definitely/not/here"
      )))
    );
  }
}
