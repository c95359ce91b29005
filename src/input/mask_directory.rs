// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/input/mask_directory.rs - 二值掩码图像目录
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

use tracing::{error, info};
use url::Url;

use super::{CorpusEntry, InputError, list_files};
use crate::{FromUrl, FromUrlWithScheme, url_to_path};

/// 目录中的每个文件都被当作一幅真值掩码图像，按文件名排序
pub struct MaskDirectory {
  files: Vec<PathBuf>,
}

impl FromUrlWithScheme for MaskDirectory {
  const SCHEME: &'static str = "masks";
}

impl FromUrl for MaskDirectory {
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

impl MaskDirectory {
  pub fn open(directory: impl AsRef<Path>) -> Result<Self, InputError> {
    let directory = directory.as_ref();
    let files = list_files(directory)?;
    info!("真值图像目录 {}: {} 个文件", directory.display(), files.len());
    Ok(Self { files })
  }

  pub fn len(&self) -> usize {
    self.files.len()
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }
}

impl IntoIterator for MaskDirectory {
  type Item = CorpusEntry;
  type IntoIter = MaskEntries;

  fn into_iter(self) -> Self::IntoIter {
    MaskEntries {
      inner: self.files.into_iter(),
    }
  }
}

pub struct MaskEntries {
  inner: std::vec::IntoIter<PathBuf>,
}

impl Iterator for MaskEntries {
  type Item = CorpusEntry;

  fn next(&mut self) -> Option<Self::Item> {
    self.inner.next().map(CorpusEntry::MaskImage)
  }
}
