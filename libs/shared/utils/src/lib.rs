pub mod ids;
pub mod notify;
pub mod test_utils;

pub use notify::{Notifier, RecordingNotifier, TracingNotifier};
