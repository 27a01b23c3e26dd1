pub mod backend;
pub mod cancel;
pub mod convert;
pub mod recorder;
pub mod session;

pub use backend::{CaptureBackend, CaptureError, MonitorInfo, XcapBackend, list_monitors};
pub use cancel::CancelToken;
pub use recorder::Recorder;
pub use session::{RecordError, RecordingSummary, RegionRecorder, SessionSettings, StopReason};
