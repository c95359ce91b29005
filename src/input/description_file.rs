// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/input/description_file.rs - 矩形真值描述文件
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

use tracing::{error, info};
use url::Url;

use super::{CorpusEntry, InputError};
use crate::{FromUrl, FromUrlWithScheme, ground_truth::GroundTruthDescription, url_to_path};

/// 按空行切分记录，CR+LF 与单独的 CR 均视为换行
pub fn split_records(text: &str) -> Vec<String> {
  let text = text.replace("\r\n", "\n").replace('\r', "\n");

  let mut records = Vec::new();
  let mut current: Vec<&str> = Vec::new();
  for line in text.lines() {
    if line.trim().is_empty() {
      if !current.is_empty() {
        records.push(current.join("\n"));
        current.clear();
      }
    } else {
      current.push(line);
    }
  }
  if !current.is_empty() {
    records.push(current.join("\n"));
  }

  records
}

/// 一个 UTF-8 文本文件，每条记录描述一幅图像的显著目标矩形
pub struct DescriptionFile {
  records: Vec<String>,
}

impl FromUrlWithScheme for DescriptionFile {
  const SCHEME: &'static str = "rects";
}

impl FromUrl for DescriptionFile {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(InputError::SchemeMismatch(url.scheme().to_string()));
    }

    Self::open(url_to_path(url))
  }
}

impl DescriptionFile {
  pub fn open(path: impl AsRef<Path>) -> Result<Self, InputError> {
    let path = path.as_ref().to_path_buf();
    if !path.exists() {
      return Err(InputError::NotFound(path));
    }
    if !path.is_file() {
      return Err(InputError::NotAFile(path));
    }

    let text = std::fs::read_to_string(&path)?;
    let records = split_records(&text);
    info!("真值描述文件 {}: {} 条记录", path.display(), records.len());
    Ok(Self { records })
  }

  pub fn from_text(text: &str) -> Self {
    Self {
      records: split_records(text),
    }
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}

impl IntoIterator for DescriptionFile {
  type Item = CorpusEntry;
  type IntoIter = DescriptionEntries;

  fn into_iter(self) -> Self::IntoIter {
    DescriptionEntries {
      inner: self.records.into_iter(),
    }
  }
}

/// 逐条解析记录；解析失败的记录以 [`CorpusEntry::InvalidRecord`] 返回，不影响后续记录
pub struct DescriptionEntries {
  inner: std::vec::IntoIter<String>,
}

impl Iterator for DescriptionEntries {
  type Item = CorpusEntry;

  fn next(&mut self) -> Option<Self::Item> {
    let record = self.inner.next()?;
    Some(match record.parse::<GroundTruthDescription>() {
      Ok(description) => CorpusEntry::Description(description),
      Err(error) => CorpusEntry::InvalidRecord { record, error },
    })
  }
}
