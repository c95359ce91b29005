// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/input/saliency_directory.rs - 显著图目录
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

use tracing::info;
use url::Url;

use super::{InputError, SaliencyMapSource, list_files};
use crate::{FromUrl, FromUrlWithScheme, url_to_path};

/// 显著图目录。
///
/// 标识与文件的对应关系按子串匹配：文件名包含标识即视为匹配，
/// 例如 `dog01` 匹配 `dog01_ft.png`。多个文件同时匹配时取文件名排序最靠前的一个。
pub struct SaliencyDirectory {
  directory: PathBuf,
  files: Vec<(String, PathBuf)>,
}

impl FromUrlWithScheme for SaliencyDirectory {
  const SCHEME: &'static str = "maps";
}

impl FromUrl for SaliencyDirectory {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(InputError::SchemeMismatch(url.scheme().to_string()));
    }

    Self::open(url_to_path(url))
  }
}

impl SaliencyDirectory {
  pub fn open(directory: impl AsRef<Path>) -> Result<Self, InputError> {
    let directory = directory.as_ref().to_path_buf();
    let files = list_files(&directory)?
      .into_iter()
      .map(|path| {
        let name = path
          .file_name()
          .map(|name| name.to_string_lossy().into_owned())
          .unwrap_or_default();
        (name, path)
      })
      .collect::<Vec<_>>();

    info!("显著图目录 {}: {} 个文件", directory.display(), files.len());
    Ok(Self { directory, files })
  }

  /// 接受 `maps:///dir` 形式的 URI 或普通路径
  pub fn parse(source: &str) -> Result<Self, InputError> {
    if source.contains("://") {
      Self::from_url(&Url::parse(source)?)
    } else {
      Self::open(source)
    }
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }

  pub fn len(&self) -> usize {
    self.files.len()
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }
}

impl SaliencyMapSource for SaliencyDirectory {
  fn locate(&self, identifier: &str) -> Option<PathBuf> {
    if identifier.is_empty() {
      return None;
    }

    self
      .files
      .iter()
      .find(|(name, _)| name.contains(identifier))
      .map(|(_, path)| path.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn directory(names: &[&str]) -> SaliencyDirectory {
    SaliencyDirectory {
      directory: PathBuf::from("/maps"),
      files: names
        .iter()
        .map(|name| (name.to_string(), PathBuf::from("/maps").join(name)))
        .collect(),
    }
  }

  #[test]
  fn identifiers_match_by_substring() {
    let maps = directory(&["cat02_ft.png", "dog01_ft.png"]);
    assert_eq!(maps.locate("dog01"), Some(PathBuf::from("/maps/dog01_ft.png")));
    assert_eq!(maps.locate("owl03"), None);
  }

  #[test]
  fn ambiguous_matches_take_first_name() {
    let maps = directory(&["dog01_a.png", "dog01_b.png"]);
    assert_eq!(maps.locate("dog01"), Some(PathBuf::from("/maps/dog01_a.png")));
  }

  #[test]
  fn empty_identifier_matches_nothing() {
    let maps = directory(&["dog01_a.png"]);
    assert_eq!(maps.locate(""), None);
  }
}
