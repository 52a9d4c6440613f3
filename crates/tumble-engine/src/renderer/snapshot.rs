use bytemuck::{Pod, Zeroable};

/// Per-body render data handed to the presentation layer.
/// 6 doubles = 48 bytes stride; the host reads them as a flat `Float64Array`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct BodyInstance {
    /// Body handle, as a float.
    pub id: f64,
    /// Center X in world space.
    pub x: f64,
    /// Center Y in world space.
    pub y: f64,
    pub half_width: f64,
    pub half_height: f64,
    /// Spin angle in radians.
    pub rotation: f64,
}

impl BodyInstance {
    pub const FLOATS: usize = 6;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 8;
}

/// Snapshot of every live body, rebuilt after each frame.
pub struct SnapshotBuffer {
    pub instances: Vec<BodyInstance>,
}

impl SnapshotBuffer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(16),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: BodyInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Instance data as one flat slice of doubles.
    pub fn as_floats(&self) -> &[f64] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Raw pointer to instance data for reads straight out of wasm memory.
    pub fn instances_ptr(&self) -> *const f64 {
        self.instances.as_ptr() as *const f64
    }
}

impl Default for SnapshotBuffer {
    fn default() -> Self {
        Self::new()
    }
}
