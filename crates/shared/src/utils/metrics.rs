use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::metrics::{counter::Counter, family::Family, gauge::Gauge};
use prometheus_client::registry::Registry;
use prometheus_client_derive_encode::{EncodeLabelSet, EncodeLabelValue};
use std::{
    fs,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use sysinfo::System;

fn get_thread_count(pid: usize) -> Option<i64> {
    let contents = fs::read_to_string(format!("/proc/{pid}/status")).ok()?;

    contents
        .lines()
        .find(|line| line.starts_with("Threads:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|count| count.parse::<i64>().ok())
}

#[derive(Debug, Clone)]
pub struct SystemMetrics {
    pub memory_alloc_bytes: Gauge,
    pub memory_virtual_bytes: Gauge,
    pub available_memory_kib: Gauge,
    pub thread_usage: Gauge,
    pub cpu_usage_percent: Gauge,
    pub process_start_time: Gauge,
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMetrics {
    pub fn new() -> Self {
        let start_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let metrics = Self {
            memory_alloc_bytes: Gauge::default(),
            memory_virtual_bytes: Gauge::default(),
            available_memory_kib: Gauge::default(),
            thread_usage: Gauge::default(),
            cpu_usage_percent: Gauge::default(),
            process_start_time: Gauge::default(),
        };

        metrics.process_start_time.set(start_time as i64);
        metrics
    }

    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "process_memory_alloc_bytes",
            "Resident memory of the process in bytes",
            self.memory_alloc_bytes.clone(),
        );

        registry.register(
            "process_memory_virtual_bytes",
            "Virtual memory of the process in bytes",
            self.memory_virtual_bytes.clone(),
        );

        registry.register(
            "system_available_memory_kib",
            "Available system memory in KiB",
            self.available_memory_kib.clone(),
        );

        registry.register(
            "process_thread_total",
            "Thread total",
            self.thread_usage.clone(),
        );

        registry.register(
            "system_cpu_usage_percent",
            "Global cpu usage",
            self.cpu_usage_percent.clone(),
        );

        registry.register(
            "process_start_time_seconds",
            "Start time of the process since unix epoch in seconds",
            self.process_start_time.clone(),
        );
    }

    pub async fn update_metrics(&self) {
        let mut sys = System::new_all();
        sys.refresh_all();

        let pid = std::process::id() as usize;

        if let Some(process) = sys.process(sysinfo::Pid::from(pid)) {
            self.memory_alloc_bytes.set(process.memory() as i64);
            self.memory_virtual_bytes.set(process.virtual_memory() as i64);
            self.available_memory_kib
                .set((sys.available_memory() / 1_024) as i64);
            self.cpu_usage_percent.set(sys.global_cpu_usage() as i64);

            if let Some(thread_count) = get_thread_count(pid) {
                self.thread_usage.set(thread_count);
            }
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Status {
    Success,
    Error,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct Labels {
    pub method: Method,
    pub status: Status,
}

#[derive(Clone, Debug)]
pub struct Metrics {
    pub request_counter: Family<Labels, Counter>,
    pub request_duration: Family<Labels, Histogram>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            request_counter: Family::default(),
            request_duration: Family::new_with_constructor(|| {
                Histogram::new(
                    [
                        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                    ]
                    .into_iter(),
                )
            }),
        }
    }

    pub fn record(&self, method: Method, status: Status, duration_secs: f64) {
        let labels = Labels { method, status };
        self.request_counter.get_or_create(&labels).inc();
        self.request_duration
            .get_or_create(&labels)
            .observe(duration_secs);
    }

    pub fn count(&self, method: Method, status: Status) -> u64 {
        self.request_counter
            .get_or_create(&Labels { method, status })
            .get()
    }
}

pub async fn run_metrics_collector(system_metrics: Arc<SystemMetrics>) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(15));
    loop {
        interval.tick().await;
        system_metrics.update_metrics().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus_client::encoding::text::encode;

    #[test]
    fn record_counts_by_method_and_status() {
        let metrics = Metrics::new();
        metrics.record(Method::Post, Status::Success, 0.02);
        metrics.record(Method::Post, Status::Success, 0.03);
        metrics.record(Method::Post, Status::Error, 0.5);

        assert_eq!(metrics.count(Method::Post, Status::Success), 2);
        assert_eq!(metrics.count(Method::Post, Status::Error), 1);
        assert_eq!(metrics.count(Method::Get, Status::Success), 0);
    }

    #[test]
    fn registered_metrics_are_encoded() {
        let mut registry = Registry::default();
        let metrics = Metrics::new();
        registry.register(
            "warehouse_service_request_counter",
            "requests",
            metrics.request_counter.clone(),
        );
        metrics.record(Method::Get, Status::Success, 0.01);

        let mut buffer = String::new();
        encode(&mut buffer, &registry).unwrap();

        assert!(buffer.contains("warehouse_service_request_counter"));
        assert!(buffer.contains("method=\"Get\""));
    }
}
