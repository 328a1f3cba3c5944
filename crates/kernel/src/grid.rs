use crate::WorldError;
use tileworld_common::{CellType, GridCoord};

/// Largest cell count a level may ask for.
pub const MAX_CELLS: u64 = 1 << 24;

/// Fixed-size terrain grid, stored row-major (`z` outer, `x` inner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<CellType>,
}

impl Grid {
    /// Create a `width` x `height` grid with every cell set to `fill`.
    /// Sizes from level files go through [`Grid::try_new`].
    pub fn new(width: u32, height: u32, fill: CellType) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width as usize * height as usize],
        }
    }

    /// Like [`Grid::new`], but refuses shapes over [`MAX_CELLS`] before
    /// allocating.
    pub fn try_new(width: u32, height: u32, fill: CellType) -> Result<Self, WorldError> {
        let cells = (width as u64).checked_mul(height as u64);
        match cells {
            Some(n) if n <= MAX_CELLS => Ok(Self::new(width, height, fill)),
            _ => Err(WorldError::GridTooLarge {
                width,
                height,
                max: MAX_CELLS,
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells (`width * height`).
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, x: u32, z: u32) -> bool {
        x < self.width && z < self.height
    }

    /// Cell type at `(x, z)`, or `None` outside the grid.
    pub fn cell(&self, x: u32, z: u32) -> Option<CellType> {
        self.index(x, z).map(|i| self.cells[i])
    }

    /// Change the type of one cell. The grid shape never changes.
    pub fn set_cell(&mut self, x: u32, z: u32, ty: CellType) -> Result<(), WorldError> {
        let i = self.index(x, z).ok_or(WorldError::OutOfBounds {
            x,
            z,
            width: self.width,
            height: self.height,
        })?;
        self.cells[i] = ty;
        Ok(())
    }

    /// Fill the rectangle starting at `(x, z)`. Fails without touching any
    /// cell when the rectangle leaves the grid.
    pub fn fill_rect(
        &mut self,
        x: u32,
        z: u32,
        width: u32,
        height: u32,
        ty: CellType,
    ) -> Result<(), WorldError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        let x_end = x.saturating_add(width - 1);
        let z_end = z.saturating_add(height - 1);
        if !self.contains(x_end, z_end) {
            return Err(WorldError::OutOfBounds {
                x: x_end,
                z: z_end,
                width: self.width,
                height: self.height,
            });
        }
        for cz in z..=z_end {
            for cx in x..=x_end {
                self.set_cell(cx, cz, ty)?;
            }
        }
        Ok(())
    }

    /// Iterate cells in row-major order: `z` outer, `x` inner.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, CellType)> + '_ {
        let width = self.width.max(1);
        self.cells.iter().enumerate().map(move |(i, ty)| {
            let i = i as u32;
            (GridCoord::new(i % width, i / width), *ty)
        })
    }

    fn index(&self, x: u32, z: u32) -> Option<usize> {
        self.contains(x, z)
            .then(|| z as usize * self.width as usize + x as usize)
    }
}
