//! Session performance statistics.
//!
//! The accumulator keeps running sums so every `record_*` call is O(1);
//! averages are derived at snapshot time. Counters reflect delivered final
//! results only: interim hypotheses are revisions of the same utterance, so
//! counting them would multiply-count a single recognition.

use crate::backend::{BackendId, SpeechResult};
use crate::error::RecognitionError;
use serde::Serialize;
use std::collections::HashMap;

/// Point-in-time view of the accumulated counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStatistics {
    pub total_recognitions: u64,
    pub average_accuracy: f64,
    pub average_speed_ms: f64,
    pub error_rate: f64,
    pub language_usage: HashMap<String, u64>,
    pub backend_usage: HashMap<String, u64>,
    pub switch_count: u64,
}

#[derive(Debug, Default)]
pub struct StatsAccumulator {
    results: u64,
    errors: u64,
    confidence_sum: f64,
    speed_sum_ms: f64,
    language_usage: HashMap<String, u64>,
    backend_usage: HashMap<String, u64>,
    switches: u64,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a delivered final result. Interim results are never recorded;
    /// the caller filters on `is_final` before calling this.
    pub fn record_result(&mut self, result: &SpeechResult) {
        self.results += 1;
        self.confidence_sum += f64::from(result.confidence);
        self.speed_sum_ms += result.metadata.processing_time_ms as f64;
        *self
            .language_usage
            .entry(result.language.clone())
            .or_insert(0) += 1;
        *self
            .backend_usage
            .entry(result.metadata.backend.label().to_string())
            .or_insert(0) += 1;
    }

    pub fn record_error(&mut self, _error: &RecognitionError) {
        self.errors += 1;
    }

    pub fn record_switch(&mut self, _to: BackendId) {
        self.switches += 1;
    }

    pub fn total_recognitions(&self) -> u64 {
        self.results
    }

    pub fn snapshot(&self) -> PerformanceStatistics {
        let results = self.results as f64;
        let attempts = (self.results + self.errors) as f64;
        PerformanceStatistics {
            total_recognitions: self.results,
            average_accuracy: if self.results > 0 {
                self.confidence_sum / results
            } else {
                0.0
            },
            average_speed_ms: if self.results > 0 {
                self.speed_sum_ms / results
            } else {
                0.0
            },
            error_rate: if attempts > 0.0 {
                self.errors as f64 / attempts
            } else {
                0.0
            },
            language_usage: self.language_usage.clone(),
            backend_usage: self.backend_usage.clone(),
            switch_count: self.switches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(confidence: f32, language: &str, backend: BackendId, speed_ms: u64) -> SpeechResult {
        let mut r = SpeechResult::simple("hello", confidence, language);
        r.metadata.backend = backend;
        r.metadata.processing_time_ms = speed_ms;
        r
    }

    #[test]
    fn empty_accumulator_snapshots_to_zeros() {
        let stats = StatsAccumulator::new();
        assert_eq!(stats.snapshot(), PerformanceStatistics::default());
    }

    #[test]
    fn averages_follow_recorded_results() {
        let mut stats = StatsAccumulator::new();
        stats.record_result(&result(0.8, "en-US", BackendId::Native, 100));
        stats.record_result(&result(0.6, "es-ES", BackendId::Neural, 300));

        let snap = stats.snapshot();
        assert_eq!(snap.total_recognitions, 2);
        assert!((snap.average_accuracy - 0.7).abs() < 1e-6);
        assert!((snap.average_speed_ms - 200.0).abs() < 1e-6);
        assert_eq!(snap.language_usage["en-US"], 1);
        assert_eq!(snap.language_usage["es-ES"], 1);
        assert_eq!(snap.backend_usage["native"], 1);
        assert_eq!(snap.backend_usage["neural"], 1);
    }

    #[test]
    fn error_rate_counts_errors_against_attempts() {
        let mut stats = StatsAccumulator::new();
        for _ in 0..3 {
            stats.record_result(&result(0.9, "en-US", BackendId::Native, 50));
        }
        stats.record_error(&RecognitionError::NetworkError("down".into()));

        let snap = stats.snapshot();
        assert_eq!(snap.total_recognitions, 3);
        assert!((snap.error_rate - 0.25).abs() < 1e-9);
    }

    #[test]
    fn switches_are_counted() {
        let mut stats = StatsAccumulator::new();
        stats.record_switch(BackendId::Neural);
        stats.record_switch(BackendId::Native);
        assert_eq!(stats.snapshot().switch_count, 2);
    }
}
