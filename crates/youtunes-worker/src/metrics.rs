//! Pipeline metrics.

use metrics::{counter, histogram};

use youtunes_models::ItemStatus;

pub mod names {
    pub const RUNS_TOTAL: &str = "youtunes_runs_total";
    pub const RUN_DURATION_SECONDS: &str = "youtunes_run_duration_seconds";
    pub const ITEMS_TOTAL: &str = "youtunes_run_items_total";
    pub const POLL_ATTEMPTS: &str = "youtunes_prediction_poll_attempts";
    pub const POLL_TIMEOUTS_TOTAL: &str = "youtunes_prediction_timeouts_total";
    pub const UPLOAD_FALLBACKS_TOTAL: &str = "youtunes_upload_fallbacks_total";
}

pub fn record_run(status: &'static str, duration_secs: f64) {
    counter!(names::RUNS_TOTAL, "status" => status).increment(1);
    histogram!(names::RUN_DURATION_SECONDS).record(duration_secs);
}

pub fn record_item(status: ItemStatus) {
    counter!(names::ITEMS_TOTAL, "outcome" => status.as_str()).increment(1);
}

pub fn record_poll_attempts(attempts: u32) {
    histogram!(names::POLL_ATTEMPTS).record(attempts as f64);
}

pub fn record_poll_timeout() {
    counter!(names::POLL_TIMEOUTS_TOTAL).increment(1);
}

pub fn record_upload_fallback() {
    counter!(names::UPLOAD_FALLBACKS_TOTAL).increment(1);
}
