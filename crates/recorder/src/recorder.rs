use common::Region;
use common::async_trait::async_trait;

use crate::cancel::CancelToken;
use crate::session::{RecordError, RecordingSummary};

#[async_trait(?Send)]
pub trait Recorder {
    /// Records until a configured bound is hit or `cancel` fires. The output
    /// file is closed before this returns, on every path.
    async fn record(&mut self, cancel: CancelToken) -> Result<RecordingSummary, RecordError>;
    fn region(&self) -> Region;
}
