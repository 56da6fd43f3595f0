use std::sync::{Arc, Mutex};

use buildwatch::errors::Result;
use buildwatch::render::{plain_line, Renderer};
use buildwatch::types::CommandResult;

/// One rendered screen: build result, then test result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub build: CommandResult,
    pub test: CommandResult,
}

impl Frame {
    /// The two lines as they would be printed, without styling.
    pub fn lines(&self) -> [String; 2] {
        [plain_line(&self.build), plain_line(&self.test)]
    }

    /// Neither result is in progress.
    pub fn is_settled(&self) -> bool {
        !self.build.status.is_dirty() && !self.test.status.is_dirty()
    }

    pub fn is_all_dirty(&self) -> bool {
        self.build.status.is_dirty() && self.test.status.is_dirty()
    }
}

/// A renderer that records every frame instead of drawing it.
///
/// Clones share the same frame list, so a test can keep one clone while the
/// aggregator owns the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Frame> {
        self.frames.lock().unwrap().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Poll until a frame satisfies `pred`, for at most ~5 seconds.
    pub async fn wait_for<F>(&self, pred: F) -> Frame
    where
        F: Fn(&Frame) -> bool,
    {
        self.wait_for_from(0, pred).await
    }

    /// Like [`wait_for`](Self::wait_for), ignoring the first `skip` frames.
    pub async fn wait_for_from<F>(&self, skip: usize, pred: F) -> Frame
    where
        F: Fn(&Frame) -> bool,
    {
        for _ in 0..500 {
            if let Some(frame) = self.frames().into_iter().skip(skip).find(|f| pred(f)) {
                return frame;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("no matching frame rendered; frames: {:#?}", self.frames());
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, build: &CommandResult, test: &CommandResult) -> Result<()> {
        self.frames.lock().unwrap().push(Frame {
            build: build.clone(),
            test: test.clone(),
        });
        Ok(())
    }
}
