// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/output/result_files.rs - 文本结果文件
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

use std::io::{self, Write};

use chrono::{DateTime, Utc};

use crate::{aggregate::CorpusSummary, evaluate::EvaluationTable, outcome::CorpusReport};

pub const RESULT_ALL_FILE: &str = "result_all.txt";
pub const RESULT_MEAN_FILE: &str = "result_mean.txt";
pub const GROUND_TRUTH_SIZES_FILE: &str = "ground_truth_sizes.txt";

const SIGNIFICANT_DIGITS: usize = 4;

/// 按 `%.<digits>g` 的规则格式化：保留给定的有效数字位数且不去掉末尾的零，
/// 十进制指数在 `[-4, digits)` 之外时使用科学计数法，指数至少两位。
pub fn format_significant(value: f64, digits: usize) -> String {
  let digits = digits.max(1);
  if !value.is_finite() {
    return value.to_string();
  }
  if value == 0.0 {
    return format!("{:.*}", digits - 1, value);
  }

  let scientific = format!("{:.*e}", digits - 1, value);
  let Some((mantissa, exponent)) = scientific.split_once('e') else {
    return scientific;
  };
  let Ok(exponent) = exponent.parse::<i32>() else {
    return scientific;
  };

  if (-4..digits as i32).contains(&exponent) {
    let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
    format!("{:.*}", decimals, value)
  } else {
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exponent.abs())
  }
}

fn number(value: f64) -> String {
  format_significant(value, SIGNIFICANT_DIGITS)
}

fn write_header(
  writer: &mut impl Write,
  generated: &DateTime<Utc>,
  columns: &str,
) -> io::Result<()> {
  writeln!(
    writer,
    "# Saliency map evaluation, precision and recall per binarization threshold"
  )?;
  writeln!(
    writer,
    "# (frequency-tuned protocol of Achanta et al., CVPR 2009)"
  )?;
  writeln!(
    writer,
    "# generated {}",
    generated.format("%Y-%m-%d %H:%M:%S UTC")
  )?;
  writeln!(writer, "#")?;
  writeln!(writer, "# {}", columns)
}

/// 每个阈值一行，依次列出每幅已评估图像的精确率与召回率，顺序与语料一致
pub fn write_all_results(
  writer: &mut impl Write,
  report: &CorpusReport,
  generated: &DateTime<Utc>,
) -> io::Result<()> {
  write_header(
    writer,
    generated,
    "threshold precision recall precision recall ...",
  )?;

  let (identifiers, tables): (Vec<&str>, Vec<&EvaluationTable>) = report.evaluated().unzip();
  writeln!(writer, "# images: {}", identifiers.join(" "))?;

  for threshold in 0..=u8::MAX {
    write!(writer, "{}", threshold)?;
    for table in &tables {
      let entry = table.get(threshold);
      write!(writer, " {} {}", number(entry.precision), number(entry.recall))?;
    }
    writeln!(writer)?;
  }

  Ok(())
}

pub fn write_mean_results(
  writer: &mut impl Write,
  summary: &CorpusSummary,
  generated: &DateTime<Utc>,
) -> io::Result<()> {
  write_header(writer, generated, "threshold mean_precision mean_recall")?;

  for threshold in 0..=u8::MAX {
    let mean = summary.mean(threshold);
    writeln!(
      writer,
      "{} {} {}",
      threshold,
      number(mean.precision),
      number(mean.recall)
    )?;
  }

  Ok(())
}

pub fn write_ground_truth_sizes(
  writer: &mut impl Write,
  report: &CorpusReport,
  generated: &DateTime<Utc>,
) -> io::Result<()> {
  writeln!(
    writer,
    "# Sizes of ground truths relative to their image's size"
  )?;
  writeln!(
    writer,
    "# generated {}",
    generated.format("%Y-%m-%d %H:%M:%S UTC")
  )?;
  writeln!(writer, "#")?;
  writeln!(writer, "# image_name relative_size_gt")?;

  for (identifier, size) in report.sizes() {
    writeln!(writer, "{} {}", identifier, number(size))?;
  }

  Ok(())
}
