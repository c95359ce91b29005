// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/output.rs - 评估结果输出定义
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

use thiserror::Error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, ground_truth::GroundTruth, outcome::CorpusReport};

pub trait Report {
  type Error;

  /// 保存二值化后的真值，可能从多个工作线程同时调用
  fn save_ground_truth(&self, ground_truth: &GroundTruth) -> Result<(), Self::Error>;

  fn write_report(&self, report: &CorpusReport) -> Result<(), Self::Error>;
}

pub mod result_files;
pub use self::result_files::format_significant;

#[cfg(feature = "plot")]
pub mod plot;

mod directory_report;
pub use self::directory_report::{DirectoryReport, DirectoryReportError};

mod log_report;
pub use self::log_report::LogReport;

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("目录结果输出错误: {0}")]
  DirectoryReportError(#[from] DirectoryReportError),
  #[error("URI 解析错误: {0}")]
  UrlError(#[from] url::ParseError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum ReportWrapper {
  DirectoryReport(DirectoryReport),
  LogReport(LogReport),
}

impl FromUrl for ReportWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      DirectoryReport::SCHEME => {
        let output = DirectoryReport::from_url(url)?;
        Ok(ReportWrapper::DirectoryReport(output))
      }
      LogReport::SCHEME => Ok(ReportWrapper::LogReport(LogReport::default())),
      _ => Err(OutputError::SchemeMismatch),
    }
  }
}

impl ReportWrapper {
  /// 接受 `folder:///dir`、`log://` 或普通目录路径；缺省时只在日志中输出汇总
  pub fn parse(source: Option<&str>) -> Result<Self, OutputError> {
    match source {
      None => Ok(ReportWrapper::LogReport(LogReport::default())),
      Some(source) if source.contains("://") => Self::from_url(&Url::parse(source)?),
      Some(source) => Ok(ReportWrapper::DirectoryReport(DirectoryReport::new(
        Path::new(source),
      )?)),
    }
  }
}

impl Report for ReportWrapper {
  type Error = OutputError;

  fn save_ground_truth(&self, ground_truth: &GroundTruth) -> Result<(), Self::Error> {
    match self {
      ReportWrapper::DirectoryReport(output) => output
        .save_ground_truth(ground_truth)
        .map_err(OutputError::from),
      ReportWrapper::LogReport(output) => match output.save_ground_truth(ground_truth) {
        Ok(()) => Ok(()),
        Err(never) => match never {},
      },
    }
  }

  fn write_report(&self, report: &CorpusReport) -> Result<(), Self::Error> {
    match self {
      ReportWrapper::DirectoryReport(output) => {
        output.write_report(report).map_err(OutputError::from)
      }
      ReportWrapper::LogReport(output) => match output.write_report(report) {
        Ok(()) => Ok(()),
        Err(never) => match never {},
      },
    }
  }
}
