// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/input.rs - 真值语料与显著图输入
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
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  ground_truth::{DescriptionError, GroundTruthDescription},
  identifier_of,
};

mod description_file;
pub use self::description_file::{DescriptionEntries, DescriptionFile, split_records};

mod mask_directory;
pub use self::mask_directory::{MaskDirectory, MaskEntries};

mod saliency_directory;
pub use self::saliency_directory::SaliencyDirectory;

#[derive(Error, Debug)]
pub enum InputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("URI 解析错误: {0}")]
  UrlError(#[from] url::ParseError),
  #[error("路径不存在: {0}")]
  NotFound(PathBuf),
  #[error("路径不是目录: {0}")]
  NotADirectory(PathBuf),
  #[error("路径不是文件: {0}")]
  NotAFile(PathBuf),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 根据显著图标识查找对应的显著图文件
pub trait SaliencyMapSource {
  fn locate(&self, identifier: &str) -> Option<PathBuf>;
}

/// 语料中的一项真值
#[derive(Debug, Clone)]
pub enum CorpusEntry {
  /// 二值掩码图像文件
  MaskImage(PathBuf),
  /// 解析成功的矩形描述
  Description(GroundTruthDescription),
  /// 解析失败的描述记录，保留原文用于报告
  InvalidRecord {
    record: String,
    error: DescriptionError,
  },
}

impl CorpusEntry {
  /// 用于日志与报告的标识
  pub fn label(&self) -> String {
    match self {
      CorpusEntry::MaskImage(path) => {
        let name = path
          .file_name()
          .map(|name| name.to_string_lossy().into_owned())
          .unwrap_or_default();
        identifier_of(&name).to_string()
      }
      CorpusEntry::Description(description) => description.identifier().to_string(),
      CorpusEntry::InvalidRecord { record, .. } => record
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| identifier_of(line).to_string())
        .unwrap_or_default(),
    }
  }
}

pub(crate) fn list_files(directory: &Path) -> Result<Vec<PathBuf>, InputError> {
  if !directory.exists() {
    return Err(InputError::NotFound(directory.to_path_buf()));
  }
  if !directory.is_dir() {
    return Err(InputError::NotADirectory(directory.to_path_buf()));
  }

  let mut files = Vec::new();
  for entry in std::fs::read_dir(directory)? {
    let path = entry?.path();
    if path.is_file() {
      files.push(path);
    }
  }
  files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
  Ok(files)
}

pub enum CorpusInput {
  MaskDirectory(MaskDirectory),
  DescriptionFile(DescriptionFile),
}

impl FromUrl for CorpusInput {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      MaskDirectory::SCHEME => Ok(CorpusInput::MaskDirectory(MaskDirectory::from_url(url)?)),
      DescriptionFile::SCHEME => Ok(CorpusInput::DescriptionFile(DescriptionFile::from_url(
        url,
      )?)),
      other => Err(InputError::SchemeMismatch(format!(
        "期望 '{}' 或 '{}', 实际为 '{}'",
        MaskDirectory::SCHEME,
        DescriptionFile::SCHEME,
        other
      ))),
    }
  }
}

impl CorpusInput {
  /// 目录视为掩码图像目录，文件视为描述文件
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InputError> {
    let path = path.as_ref();
    if path.is_dir() {
      Ok(CorpusInput::MaskDirectory(MaskDirectory::open(path)?))
    } else {
      Ok(CorpusInput::DescriptionFile(DescriptionFile::open(path)?))
    }
  }

  /// 接受 `masks:///dir`、`rects:///file.txt` 形式的 URI 或普通路径
  pub fn parse(source: &str) -> Result<Self, InputError> {
    if source.contains("://") {
      Self::from_url(&Url::parse(source)?)
    } else {
      Self::from_path(source)
    }
  }

  pub fn len(&self) -> usize {
    match self {
      CorpusInput::MaskDirectory(input) => input.len(),
      CorpusInput::DescriptionFile(input) => input.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl IntoIterator for CorpusInput {
  type Item = CorpusEntry;
  type IntoIter = CorpusEntries;

  fn into_iter(self) -> Self::IntoIter {
    match self {
      CorpusInput::MaskDirectory(input) => CorpusEntries::MaskDirectory(input.into_iter()),
      CorpusInput::DescriptionFile(input) => CorpusEntries::DescriptionFile(input.into_iter()),
    }
  }
}

pub enum CorpusEntries {
  MaskDirectory(MaskEntries),
  DescriptionFile(DescriptionEntries),
}

impl Iterator for CorpusEntries {
  type Item = CorpusEntry;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      CorpusEntries::MaskDirectory(input) => input.next(),
      CorpusEntries::DescriptionFile(input) => input.next(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_scheme_is_rejected() {
    let url = Url::parse("ftp:///tmp/corpus").unwrap();
    assert!(matches!(
      CorpusInput::from_url(&url),
      Err(InputError::SchemeMismatch(_))
    ));
  }

  #[test]
  fn labels_follow_identifiers() {
    let entry = CorpusEntry::MaskImage(PathBuf::from("/data/gt/dog01.png"));
    assert_eq!(entry.label(), "dog01");

    let entry = CorpusEntry::InvalidRecord {
      record: "\n  set/cat02.jpg\n4 x\n".to_string(),
      error: DescriptionError::MissingField("rectangles"),
    };
    assert_eq!(entry.label(), "cat02");
  }
}
