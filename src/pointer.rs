//! Global pointer position, tracked from rdev's event stream.

use std::sync::{Arc, Mutex};
use std::thread;

use common::Point;
use log::warn;
use rdev::{EventType, listen};

pub trait PointerSource {
    /// Last known pointer position, `None` until the pointer has moved.
    fn position(&self) -> Option<Point>;
}

/// Listens for mouse-move events on a background thread. rdev offers no way
/// to stop `listen`, so the thread lives until the process exits.
pub struct RdevPointer {
    last: Arc<Mutex<Option<Point>>>,
}

impl RdevPointer {
    pub fn spawn() -> Self {
        let last = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&last);
        thread::spawn(move || {
            let result = listen(move |event| {
                if let EventType::MouseMove { x, y } = event.event_type {
                    if let Ok(mut slot) = sink.lock() {
                        *slot = Some(Point::new(x.round() as i32, y.round() as i32));
                    }
                }
            });
            if let Err(e) = result {
                warn!("[select] pointer listener stopped: {:?}", e);
            }
        });
        Self { last }
    }
}

impl PointerSource for RdevPointer {
    fn position(&self) -> Option<Point> {
        self.last.lock().ok().and_then(|slot| *slot)
    }
}
