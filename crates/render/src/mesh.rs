use crate::RenderError;
use bytemuck::{Pod, Zeroable};
use serde::Serialize;
use std::ops::Range;

/// Vertex layout shared by terrain and billboards.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable, Serialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

pub const VERTICES_PER_CELL: u32 = 4;
pub const INDICES_PER_CELL: u32 = 6;

/// Largest vertex count addressable by `u16` indices.
pub const MAX_VERTICES: u64 = u16::MAX as u64 + 1;

const UP: [f32; 3] = [0.0, 1.0, 0.0];

/// Corner order within a cell: `(x,z) (x+1,z) (x,z+1) (x+1,z+1)`.
const CORNERS: [([f32; 2], [f32; 2]); 4] = [
    ([0.0, 0.0], [0.0, 0.0]),
    ([1.0, 0.0], [1.0, 0.0]),
    ([0.0, 1.0], [0.0, 1.0]),
    ([1.0, 1.0], [1.0, 1.0]),
];

/// Two triangles per cell over the corners above.
const CELL_TRIANGLES: [u16; 6] = [0, 1, 3, 0, 3, 2];

/// Static terrain mesh: one unit quad per cell in the XZ plane.
///
/// Cells do not share vertices. Cell `(x, z)` owns
/// `vertices[(z*W+x)*4 .. +4]` and `indices[(z*W+x)*6 .. +6]`, and its
/// indices only reference its own four vertices, so every cell can be drawn
/// with its own texture.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMesh {
    width: u32,
    height: u32,
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
}

impl GridMesh {
    /// Build the mesh for a `width` x `height` grid. Geometry does not depend
    /// on cell types. An empty grid yields empty buffers.
    pub fn build(width: u32, height: u32) -> Result<Self, RenderError> {
        let _span = tracing::info_span!("grid_mesh_build", width, height).entered();

        let cells = width as u64 * height as u64;
        let vertex_count = cells.saturating_mul(VERTICES_PER_CELL as u64);
        if vertex_count > MAX_VERTICES {
            return Err(RenderError::CapacityExceeded {
                width,
                height,
                vertices: vertex_count,
                max: MAX_VERTICES,
            });
        }

        let mut vertices = Vec::with_capacity(vertex_count as usize);
        let mut indices = Vec::with_capacity((cells * INDICES_PER_CELL as u64) as usize);

        for z in 0..height {
            for x in 0..width {
                // Bounded by MAX_VERTICES above, so the base fits in u16.
                let base = vertices.len() as u16;
                for ([dx, dz], uv) in CORNERS {
                    vertices.push(Vertex::new([x as f32 + dx, 0.0, z as f32 + dz], UP, uv));
                }
                indices.extend(CELL_TRIANGLES.iter().map(|i| base + i));
            }
        }

        tracing::debug!(
            vertices = vertices.len(),
            indices = indices.len(),
            "grid mesh built"
        );
        Ok(Self {
            width,
            height,
            vertices,
            indices,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Range of `indices` belonging to cell `(x, z)`, or `None` outside the grid.
    pub fn cell_index_range(&self, x: u32, z: u32) -> Option<Range<u32>> {
        self.cell_ordinal(x, z).map(|n| {
            let start = n * INDICES_PER_CELL;
            start..start + INDICES_PER_CELL
        })
    }

    /// Range of `vertices` belonging to cell `(x, z)`, or `None` outside the grid.
    pub fn cell_vertex_range(&self, x: u32, z: u32) -> Option<Range<u32>> {
        self.cell_ordinal(x, z).map(|n| {
            let start = n * VERTICES_PER_CELL;
            start..start + VERTICES_PER_CELL
        })
    }

    fn cell_ordinal(&self, x: u32, z: u32) -> Option<u32> {
        (x < self.width && z < self.height).then(|| z * self.width + x)
    }
}
