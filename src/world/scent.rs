//! Distance-decayed odor field derived from food positions.

use serde::{Deserialize, Serialize};

use super::food::Food;

/// Per-cell odor intensity.
///
/// Each cell holds the maximum, over all food sources, of
/// `clamp(calories - floor(distance), 0, calories)`. The outermost ring of
/// cells is forced to zero after every recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScentField {
    width: usize,
    height: usize,
    cells: Vec<u32>,
}

impl ScentField {
    /// An all-zero field.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Rebuild the field from scratch. O(width · height · foods).
    pub fn recompute(&mut self, foods: &[Food]) {
        self.cells.iter_mut().for_each(|cell| *cell = 0);

        for food in foods {
            self.combine_layer(food);
        }

        self.zero_border();
    }

    fn combine_layer(&mut self, food: &Food) {
        let calories = i64::from(food.calories);
        for y in 0..self.height {
            for x in 0..self.width {
                let dx = x as f64 - food.position.x as f64;
                let dy = y as f64 - food.position.y as f64;
                let distance = (dx * dx + dy * dy).sqrt().floor() as i64;
                let intensity = (calories - distance).clamp(0, calories) as u32;

                let cell = &mut self.cells[y * self.width + x];
                *cell = (*cell).max(intensity);
            }
        }
    }

    fn zero_border(&mut self) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let last_row = self.height - 1;
        let last_col = self.width - 1;
        for x in 0..self.width {
            self.cells[x] = 0;
            self.cells[last_row * self.width + x] = 0;
        }
        for y in 0..self.height {
            self.cells[y * self.width] = 0;
            self.cells[y * self.width + last_col] = 0;
        }
    }

    /// Odor at raw coordinates. Anything outside the grid reads as `0`.
    pub fn odor_at(&self, x: i64, y: i64) -> u32 {
        if x < 0 || y < 0 {
            return 0;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.cells[y * self.width + x]
    }

    /// Strongest value anywhere in the field.
    pub fn peak(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Row slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks(self.width.max(1))
    }
}
