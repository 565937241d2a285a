//! Food sources and the collection that keeps them stocked.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{identifiers::FoodId, types::Position};

/// A stationary odor source that pays out energy when an agent reaches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    pub id: FoodId,
    pub position: Position,
    pub calories: u32,
}

impl Food {
    pub fn new(id: FoodId, position: Position, calories: u32) -> Self {
        Self {
            id,
            position,
            calories,
        }
    }
}

/// What happened to a food source after an agent reached it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodFate {
    /// Teleported to a fresh interior cell.
    Relocated(Position),
    /// Removed because the supply exceeded the desired count.
    Removed,
}

/// Food collection with a target count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodSupply {
    foods: Vec<Food>,
    desired: usize,
    calories: u32,
    next_id: u32,
}

impl FoodSupply {
    pub fn new(desired: usize, calories: u32) -> Self {
        Self {
            foods: Vec::new(),
            desired,
            calories,
            next_id: 0,
        }
    }

    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    pub fn desired(&self) -> usize {
        self.desired
    }

    pub fn calories(&self) -> u32 {
        self.calories
    }

    /// Calorie value given to food created from now on.
    pub fn set_calories(&mut self, calories: u32) {
        self.calories = calories;
    }

    /// Change the target count and create food until it is met.
    ///
    /// Surplus food is not removed here; it disappears as agents eat it.
    /// Returns the number of sources created.
    pub fn set_desired<R: Rng + ?Sized>(
        &mut self,
        desired: usize,
        width: usize,
        height: usize,
        rng: &mut R,
    ) -> usize {
        self.desired = desired;
        let missing = desired.saturating_sub(self.foods.len());
        for _ in 0..missing {
            let position = random_interior(width, height, rng);
            self.push(position, self.calories);
        }
        missing
    }

    /// Add a source at an exact position.
    pub fn push(&mut self, position: Position, calories: u32) -> FoodId {
        let id = FoodId::new(self.next_id);
        self.next_id += 1;
        self.foods.push(Food::new(id, position, calories));
        id
    }

    pub fn at(&self, position: Position) -> Option<&Food> {
        self.foods.iter().find(|food| food.position == position)
    }

    /// Handle an agent reaching food `id`.
    ///
    /// While the supply is at or below the desired count the food is
    /// relocated; once it exceeds the target the food is removed.
    pub fn consume<R: Rng + ?Sized>(
        &mut self,
        id: FoodId,
        width: usize,
        height: usize,
        rng: &mut R,
    ) -> Option<FoodFate> {
        let index = self.foods.iter().position(|food| food.id == id)?;

        if self.foods.len() <= self.desired {
            let position = random_interior(width, height, rng);
            self.foods[index].position = position;
            Some(FoodFate::Relocated(position))
        } else {
            self.foods.remove(index);
            Some(FoodFate::Removed)
        }
    }
}

/// Random cell at least two cells away from the low edges and one from the high edges.
///
/// Degrades gracefully on tiny grids instead of producing an empty range.
pub fn random_interior<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> Position {
    Position::new(interior_axis(width, rng), interior_axis(height, rng))
}

fn interior_axis<R: Rng + ?Sized>(extent: usize, rng: &mut R) -> usize {
    let last = extent.saturating_sub(1);
    let low = 2.min(last);
    let high = extent.saturating_sub(2).max(low);
    rng.random_range(low..=high)
}
