use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("repolore.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("repolore.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("repolore.client.request_duration_seconds");

pub(crate) static STREAM_FRAGMENTS: Counter = Counter::new("repolore.stream.fragments");
pub(crate) static STREAM_CHUNKS: Counter = Counter::new("repolore.stream.chunks");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("repolore.stream.errors");
pub(crate) static STREAM_DURATION: Moments = Moments::new("repolore.stream.duration_seconds");

pub(crate) static STORE_LOADS: Counter = Counter::new("repolore.store.loads");
pub(crate) static STORE_APPENDS: Counter = Counter::new("repolore.store.appends");
pub(crate) static STORE_CORRUPTIONS: Counter = Counter::new("repolore.store.corruptions");

pub(crate) static SESSION_SUBMITS: Counter = Counter::new("repolore.session.submits");
pub(crate) static SESSION_STREAM_FAILURES: Counter =
    Counter::new("repolore.session.stream_failures");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_FRAGMENTS);
    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_moments(&STREAM_DURATION);

    collector.register_counter(&STORE_LOADS);
    collector.register_counter(&STORE_APPENDS);
    collector.register_counter(&STORE_CORRUPTIONS);

    collector.register_counter(&SESSION_SUBMITS);
    collector.register_counter(&SESSION_STREAM_FAILURES);
}
