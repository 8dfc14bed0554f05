use super::{PaintOp, Surface};

/// Keeps every operation it is asked to execute.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<PaintOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<PaintOp> {
        self.ops
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl Surface for RecordingSurface {
    fn execute(&mut self, op: &PaintOp) {
        self.ops.push(op.clone());
    }
}
