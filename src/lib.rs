// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/lib.rs - 库主文件
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

pub mod aggregate;
pub mod config;
pub mod copy;
pub mod evaluate;
pub mod frame;
pub mod ground_truth;
pub mod input;
pub mod outcome;
pub mod output;
pub mod saliency;
pub mod task;

use std::{borrow::Cow, path::PathBuf};

pub trait FromUrl {
  type Error;
  fn from_url(url: &url::Url) -> Result<Self, Self::Error>
  where
    Self: Sized;
}

pub trait FromUrlWithScheme: FromUrl {
  const SCHEME: &'static str;
}

/// 将 URL 的路径部分解码为本地路径。
///
/// `folder:///data/结果` 之类的地址在 URL 中是百分号编码的，这里还原为原始路径。
pub fn url_to_path(url: &url::Url) -> PathBuf {
  let raw = url.path();
  let decoded = urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw));
  PathBuf::from(decoded.into_owned())
}

/// 去掉目录与扩展名后的文件名，作为图像标识。
///
/// 同时接受 `/` 与 `\` 作为目录分隔符，描述文件里可能出现 Windows 路径。
pub fn identifier_of(path: &str) -> &str {
  let start = path.rfind(['/', '\\']).map(|pos| pos + 1).unwrap_or(0);
  let name = &path[start..];
  match name.rfind('.') {
    Some(pos) => &name[..pos],
    None => name,
  }
}
