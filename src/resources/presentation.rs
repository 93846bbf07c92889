//! The presentation master: what ends up on screen.

use crate::frame_graph::Handle;

use super::Attachment;

/// Terminal node of a frame graph.
///
/// Compilation keeps only nodes that its color attachment transitively
/// depends on.
#[derive(Debug, Clone, Default)]
pub struct PresentationMaster {
    pub color_attachment: Option<Handle<Attachment>>,
}

impl PresentationMaster {
    pub fn new(color_attachment: Handle<Attachment>) -> Self {
        Self {
            color_attachment: Some(color_attachment),
        }
    }
}
