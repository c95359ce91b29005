// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/copy.rs - 语料整理：按真值尺寸或文件名复制文件
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

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::{
  config::{ConfigError, check_directory},
  ground_truth::GroundTruth,
  identifier_of,
  input::{InputError, list_files},
};

const PROGRESS_INTERVAL: usize = 100;

#[derive(Error, Debug)]
pub enum CopyError {
  #[error("配置错误: {0}")]
  ConfigError(#[from] ConfigError),
  #[error("输入错误: {0}")]
  InputError(#[from] InputError),
  #[error("目标路径不是目录: {0}")]
  NotADirectory(PathBuf),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("目录遍历错误: {0}")]
  WalkError(#[from] walkdir::Error),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CopyStats {
  pub processed: usize,
  pub copied: usize,
  /// 未能处理的名称（无法读取的真值或找不到的文件）
  pub missing: Vec<String>,
}

fn prepare_destination(destination: &Path) -> Result<(), CopyError> {
  if destination.exists() {
    if !destination.is_dir() {
      return Err(CopyError::NotADirectory(destination.to_path_buf()));
    }
  } else {
    info!("创建目标目录: {}", destination.display());
    std::fs::create_dir_all(destination)?;
  }
  Ok(())
}

fn copy_into(file: &Path, destination: &Path) -> Result<(), CopyError> {
  let Some(name) = file.file_name() else {
    return Ok(());
  };
  std::fs::copy(file, destination.join(name))?;
  Ok(())
}

/// 复制相对目标尺寸严格小于 `threshold_size` 的真值掩码图像。
///
/// 无法读取的文件不复制，记入 [`CopyStats::missing`]。
pub fn copy_small_ground_truth(
  source: &Path,
  destination: &Path,
  threshold_size: f64,
) -> Result<CopyStats, CopyError> {
  check_directory(source)?;
  prepare_destination(destination)?;

  let files = list_files(source)?;
  let total = files.len();
  let mut stats = CopyStats::default();

  for file in files {
    match GroundTruth::open(&file) {
      Ok(ground_truth) => {
        if ground_truth.relative_object_size() < threshold_size {
          copy_into(&file, destination)?;
          stats.copied += 1;
        }
      }
      Err(e) => {
        warn!("无法读取真值 {}: {}", file.display(), e);
        let name = file
          .file_name()
          .map(|name| name.to_string_lossy().into_owned())
          .unwrap_or_default();
        stats.missing.push(name);
      }
    }

    stats.processed += 1;
    if stats.processed % PROGRESS_INTERVAL == 0 {
      info!(
        "已处理 {} / {} (已复制: {})",
        stats.processed, total, stats.copied
      );
    }
  }

  info!("共复制 {} / {} 个文件", stats.copied, total);
  Ok(stats)
}

fn index_by_stem(directory: &Path) -> Result<BTreeMap<String, PathBuf>, CopyError> {
  let mut index = BTreeMap::new();
  for entry in WalkDir::new(directory).sort_by_file_name() {
    let entry = entry?;
    if !entry.file_type().is_file() {
      continue;
    }
    let stem = identifier_of(&entry.file_name().to_string_lossy()).to_string();
    index.entry(stem).or_insert_with(|| entry.into_path());
  }
  Ok(index)
}

/// 以 `names` 目录中各文件去掉扩展名后的名称为准，
/// 在 `images` 目录（含子目录）中查找同名文件并复制到 `destination`。
///
/// 同名文件出现多次时取路径排序最靠前的一个。
pub fn copy_defined_files(
  images: &Path,
  names: &Path,
  destination: &Path,
) -> Result<CopyStats, CopyError> {
  check_directory(names)?;
  check_directory(images)?;

  let wanted = list_files(names)?
    .into_iter()
    .filter_map(|path| {
      let name = path.file_name()?.to_string_lossy().into_owned();
      Some(identifier_of(&name).to_string())
    })
    .collect::<Vec<_>>();

  let index = index_by_stem(images)?;
  info!("{} 下共索引 {} 个文件", images.display(), index.len());

  prepare_destination(destination)?;

  let mut stats = CopyStats::default();
  for name in wanted {
    stats.processed += 1;
    match index.get(&name) {
      Some(file) => {
        copy_into(file, destination)?;
        stats.copied += 1;
      }
      None => {
        warn!("在 {} 及其子目录中找不到 {}", images.display(), name);
        stats.missing.push(name);
      }
    }
  }

  info!("共复制 {} / {} 个文件", stats.copied, stats.processed);
  Ok(stats)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn destination_must_be_a_directory() {
    let file = std::env::temp_dir().join(format!("xianzhu-copy-{}.txt", std::process::id()));
    std::fs::write(&file, b"x").unwrap();
    assert!(matches!(
      prepare_destination(&file),
      Err(CopyError::NotADirectory(_))
    ));
    std::fs::remove_file(&file).unwrap();
  }

  #[test]
  fn missing_source_is_a_config_error() {
    let result = copy_small_ground_truth(
      Path::new("/definitely/not/here"),
      &std::env::temp_dir(),
      0.5,
    );
    assert!(matches!(
      result,
      Err(CopyError::ConfigError(ConfigError::DirectoryNotFound(_)))
    ));
  }

  #[test]
  fn index_takes_first_file_per_stem_in_walk_order() {
    let root = std::env::temp_dir().join(format!("xianzhu-index-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(root.join("a/same.png")).unwrap();
    std::fs::create_dir_all(root.join("b")).unwrap();
    std::fs::write(root.join("a/pic.jpg"), "first").unwrap();
    std::fs::write(root.join("b/pic.png"), "second").unwrap();
    std::fs::write(root.join("a/same.png/inner.txt"), "inner").unwrap();

    let index = index_by_stem(&root).unwrap();

    assert_eq!(index.len(), 2);
    assert_eq!(index["pic"], root.join("a/pic.jpg"));
    assert_eq!(index["inner"], root.join("a/same.png/inner.txt"));
    assert!(!index.contains_key("same"));

    std::fs::remove_dir_all(&root).unwrap();
  }
}
