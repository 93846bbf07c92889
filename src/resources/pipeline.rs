//! Pipeline state objects.

use crate::frame_graph::Handle;

use super::DescriptorSetLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    Graphics,
    Compute,
}

/// A compiled pipeline. Shader compilation happens elsewhere; the graph only
/// needs the descriptor set layouts the pipeline was built against.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub label: Option<String>,
    pub kind: PipelineKind,
    pub layouts: Vec<Handle<DescriptorSetLayout>>,
}

impl Pipeline {
    pub fn graphics() -> Self {
        Self {
            label: None,
            kind: PipelineKind::Graphics,
            layouts: Vec::new(),
        }
    }

    pub fn compute() -> Self {
        Self {
            label: None,
            kind: PipelineKind::Compute,
            layouts: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_layout(mut self, layout: Handle<DescriptorSetLayout>) -> Self {
        self.layouts.push(layout);
        self
    }
}
