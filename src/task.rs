// 该文件是 Xianzhu （显著性评估） 项目的一部分。
// src/task.rs - 评估任务
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
  any::Any,
  collections::HashSet,
  panic::{AssertUnwindSafe, catch_unwind},
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  thread,
  time::{Duration, Instant},
};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
  config::EvaluateConfig,
  ground_truth::GroundTruth,
  input::{CorpusEntry, SaliencyMapSource},
  outcome::{CorpusReport, ImageOutcome, SkipReason},
  output::Report,
  saliency::SaliencyNormalizer,
};

pub trait Task<I, S, O>: Sized {
  type Error;
  fn run_task(self, input: I, saliency: S, output: O) -> Result<CorpusReport, Self::Error>;
}

/// 对语料中的每一项真值并行评估，按语料顺序汇总并输出结果
#[derive(Debug, Clone)]
pub struct EvaluateTask {
  threshold_gt: f64,
  beta: f64,
  normalizer: SaliencyNormalizer,
  save_ground_truth: bool,
  jobs: Option<usize>,
  cancel: Arc<AtomicBool>,
}

impl Default for EvaluateTask {
  fn default() -> Self {
    Self {
      threshold_gt: 0.5,
      beta: 1.0,
      normalizer: SaliencyNormalizer::default(),
      save_ground_truth: false,
      jobs: None,
      cancel: Arc::new(AtomicBool::new(false)),
    }
  }
}

impl EvaluateTask {
  pub fn from_config(config: &EvaluateConfig) -> Self {
    Self::default()
      .with_threshold_gt(config.threshold_gt)
      .with_beta(config.beta)
      .with_save_ground_truth(config.save_ground_truth)
      .with_jobs(config.jobs)
  }

  pub fn with_threshold_gt(mut self, threshold_gt: f64) -> Self {
    self.threshold_gt = threshold_gt;
    self
  }

  pub fn with_beta(mut self, beta: f64) -> Self {
    self.beta = beta;
    self
  }

  pub fn with_save_ground_truth(mut self, save_ground_truth: bool) -> Self {
    self.save_ground_truth = save_ground_truth;
    self
  }

  pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
    self.jobs = jobs;
    self
  }

  /// 置位后尚未开始的项将被跳过
  pub fn cancel_flag(&self) -> Arc<AtomicBool> {
    self.cancel.clone()
  }

  /// 安装 Ctrl-C 处理：收到信号后停止派发新项，30 秒后仍未退出则强制退出
  pub fn interruptible(self) -> Result<Self, ctrlc::Error> {
    let cancel = self.cancel.clone();
    ctrlc::set_handler(move || {
      info!("收到中断信号，等待进行中的图像完成...");
      cancel.store(true, Ordering::SeqCst);
      thread::spawn(|| {
        thread::sleep(Duration::from_secs(30));
        warn!("强制退出程序");
        std::process::exit(1);
      });
    })?;
    Ok(self)
  }

  fn load_ground_truth(&self, entry: CorpusEntry) -> Result<GroundTruth, SkipReason> {
    match entry {
      CorpusEntry::MaskImage(path) => Ok(GroundTruth::open(&path)?),
      CorpusEntry::Description(description) => {
        let mut ground_truth = GroundTruth::from_description(&description)?;
        ground_truth.set_binary_threshold(self.threshold_gt);
        Ok(ground_truth)
      }
      CorpusEntry::InvalidRecord { error, .. } => Err(error.into()),
    }
  }

  fn evaluate_entry<S, O>(
    &self,
    index: usize,
    entry: CorpusEntry,
    save: bool,
    saliency: &S,
    output: &O,
  ) -> ImageOutcome
  where
    S: SaliencyMapSource,
    O: Report,
    O::Error: std::fmt::Display,
  {
    let label = entry.label();

    let ground_truth = match self.load_ground_truth(entry) {
      Ok(ground_truth) => ground_truth,
      Err(reason) => return ImageOutcome::skipped(index, label, reason),
    };

    if save
      && let Err(e) = output.save_ground_truth(&ground_truth)
    {
      warn!("保存真值 {} 失败: {}", ground_truth.identifier(), e);
    }

    let Some(path) = saliency.locate(ground_truth.identifier()) else {
      return ImageOutcome::skipped(index, label, SkipReason::NoSaliencyMap);
    };
    debug!("{} 对应显著图 {}", ground_truth.identifier(), path.display());

    // 找到显著图即记录尺寸，与显著图能否加载无关
    let relative_size = Some(ground_truth.relative_object_size()).filter(|size| *size >= 0.0);
    let result = self
      .normalizer
      .load(&path, ground_truth.width(), ground_truth.height())
      .map_err(SkipReason::from)
      .and_then(|grid| ground_truth.evaluate(&grid).map_err(SkipReason::from));

    ImageOutcome {
      index,
      identifier: ground_truth.identifier().to_string(),
      relative_size,
      result,
    }
  }

  fn guarded_entry<S, O>(
    &self,
    index: usize,
    entry: CorpusEntry,
    save: bool,
    saliency: &S,
    output: &O,
  ) -> ImageOutcome
  where
    S: SaliencyMapSource,
    O: Report,
    O::Error: std::fmt::Display,
  {
    let label = entry.label();
    if self.cancel.load(Ordering::SeqCst) {
      return ImageOutcome::skipped(index, label, SkipReason::Cancelled);
    }

    debug!("开始处理第 {} 项: {}", index + 1, label);
    let now = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
      self.evaluate_entry(index, entry, save, saliency, output)
    }))
    .unwrap_or_else(|payload| {
      ImageOutcome::skipped(index, label.clone(), SkipReason::Panicked(panic_message(payload)))
    });

    match &outcome.result {
      Ok(_) => debug!(
        "完成第 {} 项: {}，耗时: {:.2?}",
        index + 1,
        outcome.identifier,
        now.elapsed()
      ),
      Err(reason) => warn!("跳过第 {} 项 {}: {}", index + 1, outcome.identifier, reason),
    }
    outcome
  }
}

impl EvaluateTask {
  /// 需要保存二值化真值的项，同一标识只保存语料中的第一条
  fn save_flags(&self, entries: &[CorpusEntry]) -> Vec<bool> {
    let mut seen = HashSet::new();
    entries
      .iter()
      .map(|entry| match entry {
        CorpusEntry::Description(description) if self.save_ground_truth => {
          let first = seen.insert(description.identifier());
          if !first {
            warn!("真值 {} 重复出现，只保存第一条记录", description.identifier());
          }
          first
        }
        _ => false,
      })
      .collect()
  }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    message.to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "未知错误".to_string()
  }
}

impl<I, S, O> Task<I, S, O> for EvaluateTask
where
  I: IntoIterator<Item = CorpusEntry>,
  S: SaliencyMapSource + Sync,
  O: Report + Sync,
  O::Error: std::error::Error + Send + Sync + 'static,
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, saliency: S, output: O) -> Result<CorpusReport, Self::Error> {
    info!("开始评估任务...");
    let entries: Vec<CorpusEntry> = input.into_iter().collect();
    info!("共 {} 项真值", entries.len());
    let save_flags = self.save_flags(&entries);

    let now = Instant::now();
    let evaluate_all = || -> Vec<ImageOutcome> {
      entries
        .into_par_iter()
        .zip(save_flags)
        .enumerate()
        .map(|(index, (entry, save))| self.guarded_entry(index, entry, save, &saliency, &output))
        .collect()
    };
    let outcomes = match self.jobs {
      Some(jobs) => rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()?
        .install(evaluate_all),
      None => evaluate_all(),
    };
    info!("评估完成，耗时: {:.2?}", now.elapsed());

    let report = CorpusReport::from_outcomes(outcomes, self.beta);
    if self.cancel.load(Ordering::SeqCst) {
      warn!("任务被中断，仅汇总已完成的图像");
    }
    info!(
      "已评估 {} / {} 幅图像",
      report.summary.evaluated_images, report.summary.images
    );
    info!(
      "真值平均相对尺寸: {:.4}",
      report.summary.mean_relative_object_size
    );

    output.write_report(&report)?;
    info!("任务完成，退出");
    Ok(report)
  }
}

#[cfg(test)]
mod tests {
  use std::{
    path::PathBuf,
    sync::{Mutex, atomic::AtomicUsize},
  };

  use super::*;
  use crate::{ground_truth::GroundTruthDescription, input::DescriptionFile};

  struct NoMaps;

  impl SaliencyMapSource for NoMaps {
    fn locate(&self, _identifier: &str) -> Option<PathBuf> {
      None
    }
  }

  #[derive(Default)]
  struct Recording {
    saved: AtomicUsize,
    reports: Mutex<Vec<usize>>,
  }

  impl Report for Recording {
    type Error = std::io::Error;

    fn save_ground_truth(&self, _ground_truth: &GroundTruth) -> Result<(), Self::Error> {
      self.saved.fetch_add(1, Ordering::SeqCst);
      Ok(())
    }

    fn write_report(&self, report: &CorpusReport) -> Result<(), Self::Error> {
      self.reports.lock().unwrap().push(report.outcomes.len());
      Ok(())
    }
  }

  impl Report for &Recording {
    type Error = std::io::Error;

    fn save_ground_truth(&self, ground_truth: &GroundTruth) -> Result<(), Self::Error> {
      (*self).save_ground_truth(ground_truth)
    }

    fn write_report(&self, report: &CorpusReport) -> Result<(), Self::Error> {
      (*self).write_report(report)
    }
  }

  fn description(identifier: &str) -> CorpusEntry {
    let record = format!("set/{identifier}.jpg\n4 4\n0 0 1 1");
    CorpusEntry::Description(record.parse::<GroundTruthDescription>().unwrap())
  }

  #[test]
  fn missing_maps_are_skipped_in_corpus_order() {
    let output = Recording::default();
    let report = EvaluateTask::default()
      .with_save_ground_truth(true)
      .with_jobs(Some(2))
      .run_task(
        vec![description("a"), description("b"), description("c")],
        NoMaps,
        &output,
      )
      .unwrap();

    let identifiers: Vec<&str> = report
      .outcomes
      .iter()
      .map(|outcome| outcome.identifier.as_str())
      .collect();
    assert_eq!(identifiers, vec!["a", "b", "c"]);
    assert!(
      report
        .outcomes
        .iter()
        .all(|outcome| matches!(outcome.skip_reason(), Some(SkipReason::NoSaliencyMap)))
    );
    assert_eq!(output.saved.load(Ordering::SeqCst), 3);
    assert_eq!(*output.reports.lock().unwrap(), vec![3]);
  }

  #[test]
  fn cancelled_task_skips_every_pending_item() {
    let task = EvaluateTask::default();
    task.cancel_flag().store(true, Ordering::SeqCst);

    let output = Recording::default();
    let report = task
      .run_task(vec![description("a"), description("b")], NoMaps, &output)
      .unwrap();
    assert!(
      report
        .outcomes
        .iter()
        .all(|outcome| matches!(outcome.skip_reason(), Some(SkipReason::Cancelled)))
    );
    assert_eq!(output.saved.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn invalid_records_are_skipped_with_their_error() {
    let output = Recording::default();
    let entry = CorpusEntry::InvalidRecord {
      record: "x.jpg\n4".to_string(),
      error: "x.jpg\n4".parse::<GroundTruthDescription>().unwrap_err(),
    };
    let report = EvaluateTask::default()
      .run_task(vec![entry], NoMaps, &output)
      .unwrap();
    assert!(matches!(
      report.outcomes[0].skip_reason(),
      Some(SkipReason::InvalidDescription(_))
    ));
    assert_eq!(report.outcomes[0].identifier, "x");
  }

  #[test]
  fn panic_payloads_become_messages() {
    assert_eq!(panic_message(Box::new("boom")), "boom");
    assert_eq!(panic_message(Box::new(String::from("bang"))), "bang");
    assert_eq!(panic_message(Box::new(7u8)), "未知错误");
  }

  #[test]
  fn duplicated_identifiers_are_saved_once() {
    let output = Recording::default();
    let report = EvaluateTask::default()
      .with_save_ground_truth(true)
      .with_jobs(Some(4))
      .run_task(
        vec![description("a"), description("a"), description("b")],
        NoMaps,
        &output,
      )
      .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(output.saved.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn out_of_range_record_does_not_stop_the_run() {
    let input =
      DescriptionFile::from_text("big.jpg\n4 4\n0 0 9223372036854775807 1\n\nok.jpg\n4 4\n0 0 1 1\n");
    let output = Recording::default();
    let report = EvaluateTask::default()
      .with_save_ground_truth(true)
      .run_task(input, NoMaps, &output)
      .unwrap();

    assert!(matches!(
      report.outcomes[0].skip_reason(),
      Some(SkipReason::InvalidDescription(_))
    ));
    assert_eq!(report.outcomes[1].identifier, "ok");
    assert!(matches!(
      report.outcomes[1].skip_reason(),
      Some(SkipReason::NoSaliencyMap)
    ));
    assert_eq!(output.saved.load(Ordering::SeqCst), 1);
  }
}
