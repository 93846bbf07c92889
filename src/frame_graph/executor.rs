//! Frame executor

use thiserror::Error;

use crate::backend::{Backend, BackendError};
use crate::resources::{CommandBuffer, RecordContext};

use super::{FrameGraph, FrameGraphError, PassRecorder};

/// Why a frame was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error(transparent)]
    Graph(#[from] FrameGraphError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Summary of one submitted frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    pub frame_index: u64,
    /// Passes whose recorder ran this frame.
    pub passes_recorded: usize,
    /// Whether recording changed the graph and forced a second compile.
    pub recompiled: bool,
    /// Top-level commands submitted.
    pub commands: usize,
}

/// Render loop driver: compile, record, linearize, submit.
pub struct FrameExecutor<B: Backend> {
    backend: B,
    frame_index: u64,
}

impl<B: Backend> FrameExecutor<B> {
    pub fn new(backend: B) -> Self {
        log::info!("Frame executor using {} backend", backend.name());
        Self {
            backend,
            frame_index: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Index of the next frame to render.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Render one frame of `graph`.
    ///
    /// On error nothing is submitted, the error is logged and returned, and
    /// the executor stays usable for the next frame.
    pub fn render_frame(&mut self, graph: &mut FrameGraph) -> Result<FrameReport, FrameError> {
        match self.try_render_frame(graph) {
            Ok(report) => {
                self.frame_index += 1;
                Ok(report)
            }
            Err(err) => {
                log::error!("Dropping frame {}: {}", self.frame_index, err);
                Err(err)
            }
        }
    }

    fn try_render_frame(&mut self, graph: &mut FrameGraph) -> Result<FrameReport, FrameError> {
        graph.compile()?;

        // Recorders only run for passes that survived pruning.
        let recorders = graph.pass_recorders()?;
        let mut changed = false;
        for PassRecorder {
            pass,
            label,
            recorder,
        } in &recorders
        {
            let mut ctx = RecordContext {
                backend: &mut self.backend,
                pass: *pass,
                label,
                frame_index: self.frame_index,
            };
            let recorded = recorder.record(&mut ctx)?;
            changed |= graph.install_recorded(*pass, recorded)?;
        }

        let recompiled = changed || graph.is_dirty();
        if recompiled {
            log::debug!(
                "Frame {}: recording changed the graph, recompiling",
                self.frame_index
            );
            graph.compile()?;
        }

        let buffers = graph.record_commands()?;
        let commands = buffers.iter().map(CommandBuffer::len).sum();
        self.backend.submit(&buffers)?;

        log::trace!(
            "Frame {}: {} pass(es) recorded, {} command(s) submitted",
            self.frame_index,
            recorders.len(),
            commands
        );

        Ok(FrameReport {
            frame_index: self.frame_index,
            passes_recorded: recorders.len(),
            recompiled,
            commands,
        })
    }
}
