//! wgpu render backend for tileworld.
//!
//! Executes frame plans from `tileworld-render`: textured terrain cells from a
//! static mesh, then alpha-blended billboards in plan order.
//!
//! # Invariants
//! - Renderer never mutates world state.
//! - Terrain buffers are uploaded once and never rewritten.
//! - No depth buffer: draw order is exactly the plan's order.

mod camera;
mod gpu;
mod shaders;

pub use camera::FollowCamera;
pub use gpu::WgpuRenderer;
