use std::ops::{Index, IndexMut};

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Dense rectangular container addressed by 2D integer points.
///
/// Points use `x` for column and `y` for row, matching screen coordinates.
/// Storage is row-major.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Grid<T> {
    width: i32,
    height: i32,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width: width as i32,
            height: height as i32,
            data: vec![T::default(); width * height],
        }
    }

    /// Reset every cell to the default value.
    pub fn clear(&mut self) {
        self.data.fill(T::default());
    }
}

impl<T> Grid<T> {
    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn get(&self, pos: IVec2) -> Option<&T> {
        self.contains(pos)
            .then(|| &self.data[(pos.y * self.width + pos.x) as usize])
    }

    pub fn get_mut(&mut self, pos: IVec2) -> Option<&mut T> {
        self.contains(pos)
            .then(|| &mut self.data[(pos.y * self.width + pos.x) as usize])
    }

    /// Iterate cells in row-major order along with their positions.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &T)> {
        let w = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, t)| (IVec2::new(i as i32 % w, i as i32 / w), t))
    }
}

impl<T> Index<IVec2> for Grid<T> {
    type Output = T;

    fn index(&self, pos: IVec2) -> &T {
        debug_assert!(self.contains(pos), "Grid: position out of bounds");
        &self.data[(pos.y * self.width + pos.x) as usize]
    }
}

impl<T> IndexMut<IVec2> for Grid<T> {
    fn index_mut(&mut self, pos: IVec2) -> &mut T {
        debug_assert!(self.contains(pos), "Grid: position out of bounds");
        &mut self.data[(pos.y * self.width + pos.x) as usize]
    }
}
