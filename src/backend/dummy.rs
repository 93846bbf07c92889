//! Dummy backend for testing and headless runs.
//!
//! Doesn't talk to a GPU; it logs and remembers the shape of every submitted
//! frame so tests can inspect what would have been executed.

use crate::resources::{CommandBuffer, CommandKind};

use super::{Backend, BackendError, BackendResult};

/// Dummy backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    frames: Vec<Vec<CommandKind>>,
    fail_next_submit: Option<BackendError>,
}

impl DummyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames submitted so far.
    pub fn submitted_frames(&self) -> usize {
        self.frames.len()
    }

    /// Command kinds of the last submitted frame, flattened across buffers.
    pub fn last_frame(&self) -> Option<&[CommandKind]> {
        self.frames.last().map(Vec::as_slice)
    }

    /// Make the next [`submit`](Backend::submit) fail with `error`.
    pub fn fail_next_submit(&mut self, error: BackendError) {
        self.fail_next_submit = Some(error);
    }
}

impl Backend for DummyBackend {
    fn name(&self) -> &str {
        "Dummy"
    }

    fn submit(&mut self, command_buffers: &[CommandBuffer]) -> BackendResult<()> {
        if let Some(error) = self.fail_next_submit.take() {
            return Err(error);
        }

        let kinds: Vec<CommandKind> = command_buffers.iter().flat_map(|cb| cb.kinds()).collect();
        log::trace!(
            "DummyBackend: submitting {} command buffer(s), {} command(s)",
            command_buffers.len(),
            kinds.len()
        );
        self.frames.push(kinds);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_submitted_frames() {
        let mut backend = DummyBackend::new();
        let mut frame = CommandBuffer::with_label("frame");
        frame.push(crate::resources::Command::EndRenderPass);

        backend.submit(&[frame]).unwrap();
        assert_eq!(backend.submitted_frames(), 1);
        assert_eq!(backend.last_frame(), Some(&[CommandKind::EndRenderPass][..]));
        assert_eq!(backend.name(), "Dummy");
    }

    #[test]
    fn injected_failure_is_returned_once() {
        let mut backend = DummyBackend::new();
        backend.fail_next_submit(BackendError::DeviceLost);
        assert_eq!(backend.submit(&[]), Err(BackendError::DeviceLost));
        assert!(backend.submit(&[]).is_ok());
        assert_eq!(backend.submitted_frames(), 1);
    }

    #[test]
    fn error_display() {
        assert_eq!(BackendError::OutOfMemory.to_string(), "Out of memory");
        assert_eq!(
            BackendError::SubmitFailed("queue full".into()).to_string(),
            "Failed to submit commands: queue full"
        );
    }
}
