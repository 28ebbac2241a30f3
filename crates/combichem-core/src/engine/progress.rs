/// Lifecycle events of an assembly run, reported per node.
#[derive(Debug, Clone)]
pub enum Progress {
    NodeStart { name: String },
    ChunkFinish { node: String, accepted: usize },
    CapReached { name: String, accepted: usize },
    NodeFinish { name: String, accepted: usize },

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub fn is_active(&self) -> bool {
        self.callback.is_some()
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Builds the event only when a callback is installed. Used on per-chunk paths.
    #[inline]
    pub fn report_with(&self, event: impl FnOnce() -> Progress) {
        if let Some(cb) = &self.callback {
            cb(event());
        }
    }
}
