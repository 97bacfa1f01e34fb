//! 下发引擎指标收集模块
//!
//! 基于 DispatchResult 收集和统计下发指标。

use std::collections::HashMap;

use metrics::{counter, gauge, histogram};

use contracts::{DispatchOutcome, DispatchResult, FailureKind};

/// 从 DispatchResult 记录指标
///
/// 每次下发调用完成时调用此函数来记录指标。
pub fn record_dispatch_result(result: &DispatchResult) {
    counter!("biodispatch_requests_total").increment(1);

    let status = if result.success { "success" } else { "partial_failure" };
    counter!("biodispatch_requests_by_status_total", "status" => status).increment(1);

    counter!("biodispatch_devices_ok_total").increment(result.success_count as u64);
    counter!("biodispatch_devices_failed_total").increment(result.failure_count as u64);

    histogram!("biodispatch_dispatch_elapsed_ms").record(result.elapsed.as_secs_f64() * 1000.0);
    gauge!("biodispatch_last_device_count").set(result.device_outcomes.len() as f64);

    for (device_id, outcome) in &result.device_outcomes {
        record_device_outcome(device_id.as_str(), outcome);
    }
}

/// 记录单设备下发结果
pub fn record_device_outcome(device_id: &str, outcome: &DispatchOutcome) {
    let status = match outcome.failure {
        None => "ok",
        Some(FailureKind::DeviceNotSupported) => "not_supported",
        Some(FailureKind::AdapterError) => "adapter_error",
        Some(FailureKind::AdapterFault) => "adapter_fault",
        Some(FailureKind::Timeout) => "timeout",
        Some(FailureKind::RequestRejected) => "request_rejected",
    };
    counter!(
        "biodispatch_device_outcomes_total",
        "device_id" => device_id.to_string(),
        "status" => status
    )
    .increment(1);
}

/// 记录批量下发
pub fn record_batch(requests: usize, chunks: usize) {
    counter!("biodispatch_batches_total").increment(1);
    histogram!("biodispatch_batch_requests").record(requests as f64);
    histogram!("biodispatch_batch_chunks").record(chunks as f64);
}

/// 下发指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DispatchStatsAggregator {
    /// 请求总数
    pub total_requests: u64,

    /// 完全成功的请求数
    pub fully_successful: u64,

    /// 设备成功总数
    pub devices_ok: u64,

    /// 设备失败总数
    pub devices_failed: u64,

    /// 各失败类别计数
    pub failure_kinds: HashMap<&'static str, u64>,

    /// 耗时统计 (毫秒)
    pub elapsed_ms: ElapsedStats,
}

impl DispatchStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, result: &DispatchResult) {
        self.total_requests += 1;
        if result.success {
            self.fully_successful += 1;
        }
        self.devices_ok += result.success_count as u64;
        self.devices_failed += result.failure_count as u64;

        for outcome in result.device_outcomes.values() {
            if let Some(kind) = outcome.failure {
                let label = match kind {
                    FailureKind::DeviceNotSupported => "not_supported",
                    FailureKind::AdapterError => "adapter_error",
                    FailureKind::AdapterFault => "adapter_fault",
                    FailureKind::Timeout => "timeout",
                    FailureKind::RequestRejected => "request_rejected",
                };
                *self.failure_kinds.entry(label).or_insert(0) += 1;
            }
        }

        self.elapsed_ms.push(result.elapsed.as_secs_f64() * 1000.0);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> DispatchSummary {
        DispatchSummary {
            total_requests: self.total_requests,
            fully_successful: self.fully_successful,
            devices_ok: self.devices_ok,
            devices_failed: self.devices_failed,
            device_failure_rate: if self.devices_ok + self.devices_failed > 0 {
                self.devices_failed as f64 / (self.devices_ok + self.devices_failed) as f64 * 100.0
            } else {
                0.0
            },
            failure_kinds: self.failure_kinds.clone(),
            elapsed_ms: self.elapsed_ms.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub total_requests: u64,
    pub fully_successful: u64,
    pub devices_ok: u64,
    pub devices_failed: u64,
    pub device_failure_rate: f64,
    pub failure_kinds: HashMap<&'static str, u64>,
    pub elapsed_ms: ElapsedStats,
}

impl std::fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Requests: {}", self.total_requests)?;
        writeln!(f, "Fully successful: {}", self.fully_successful)?;
        writeln!(
            f,
            "Devices ok/failed: {}/{} ({:.2}% failed)",
            self.devices_ok, self.devices_failed, self.device_failure_rate
        )?;
        writeln!(f, "Elapsed (ms): {}", self.elapsed_ms)?;

        if !self.failure_kinds.is_empty() {
            writeln!(f, "Failure kinds:")?;
            let mut kinds: Vec<_> = self.failure_kinds.iter().collect();
            kinds.sort();
            for (kind, count) in kinds {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

/// 在线耗时统计
#[derive(Debug, Clone, Default)]
pub struct ElapsedStats {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl ElapsedStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}

impl std::fmt::Display for ElapsedStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3} (n={})",
                self.min,
                self.max,
                self.mean(),
                self.count
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DeviceId, DispatchOutcome};
    use std::time::Duration;

    fn result(ok: usize, failed: usize) -> DispatchResult {
        let mut outcomes = HashMap::new();
        for i in 0..ok {
            outcomes.insert(
                DeviceId::from(format!("ok{i}")),
                DispatchOutcome::ok("accepted"),
            );
        }
        for i in 0..failed {
            outcomes.insert(
                DeviceId::from(format!("bad{i}")),
                DispatchOutcome::not_supported("iris_gate"),
            );
        }
        DispatchResult::from_outcomes("req-1", "42".into(), outcomes, Duration::from_millis(40))
    }

    #[test]
    fn test_elapsed_stats() {
        let mut stats = ElapsedStats::default();
        stats.push(10.0);
        stats.push(30.0);
        stats.push(20.0);

        assert_eq!(stats.count(), 3);
        assert!((stats.mean() - 20.0).abs() < 1e-10);
        assert!((stats.min() - 10.0).abs() < 1e-10);
        assert!((stats.max() - 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = DispatchStatsAggregator::new();
        aggregator.update(&result(2, 1));
        aggregator.update(&result(1, 0));

        assert_eq!(aggregator.total_requests, 2);
        assert_eq!(aggregator.fully_successful, 1);
        assert_eq!(aggregator.devices_ok, 3);
        assert_eq!(aggregator.devices_failed, 1);
        assert_eq!(aggregator.failure_kinds.get("not_supported"), Some(&1));
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = DispatchStatsAggregator::new();
        aggregator.update(&result(1, 1));

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Requests: 1"));
        assert!(output.contains("not_supported"));
    }
}
