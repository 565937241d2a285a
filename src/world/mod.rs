//! The grid the agents forage on.
//!
//! [`Environment`] owns the grid dimensions, the [`FoodSupply`] and the
//! [`ScentField`] derived from it. Every change to the food set re-derives
//! the field, so odor lookups always reflect the current food positions.

pub mod food;
pub mod scent;

use rand::Rng;
use tracing::debug;

pub use food::{Food, FoodFate, FoodSupply, random_interior};
pub use scent::ScentField;

use crate::{
    app::SimulationConfig,
    error::{Error, Result},
    identifiers::FoodId,
    types::{Direction, Position, State},
};

/// Grid, food and scent shared by every agent.
#[derive(Debug, Clone)]
pub struct Environment {
    width: usize,
    height: usize,
    food: FoodSupply,
    scent: ScentField,
}

impl Environment {
    /// An empty grid with no food.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for a zero-sized grid.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidConfiguration {
                message: format!("grid must be at least 1x1, got {width}x{height}"),
            });
        }
        Ok(Self {
            width,
            height,
            food: FoodSupply::new(0, 0),
            scent: ScentField::new(width, height),
        })
    }

    /// Grid stocked with the configured amount of food.
    pub fn from_config<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Result<Self> {
        let mut env = Self::new(config.grid_width, config.grid_height)?;
        env.food.set_calories(config.food_calories);
        env.set_desired_food(config.desired_food, rng);
        Ok(env)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    pub fn scent(&self) -> &ScentField {
        &self.scent
    }

    pub fn foods(&self) -> &[Food] {
        self.food.foods()
    }

    pub fn food_supply(&self) -> &FoodSupply {
        &self.food
    }

    /// Odor at raw coordinates; `0` outside the grid.
    pub fn odor_at(&self, x: i64, y: i64) -> u32 {
        self.scent.odor_at(x, y)
    }

    pub fn odor_at_position(&self, position: Position) -> u32 {
        self.scent.odor_at(position.x as i64, position.y as i64)
    }

    /// Food occupying `position`, if any.
    pub fn check_food(&self, position: Position) -> Option<&Food> {
        self.food.at(position)
    }

    /// Odor-gradient signs around `position`.
    ///
    /// Neighbors are read without wrap-around, so an agent on the edge
    /// sees the outside as odorless.
    pub fn perceive(&self, position: Position) -> State {
        let here = i64::from(self.odor_at_position(position));
        let delta = |direction: Direction| {
            let (x, y) = position.neighbor(direction);
            i64::from(self.odor_at(x, y)) - here
        };
        State::from_differences(
            delta(Direction::Up),
            delta(Direction::Down),
            delta(Direction::Left),
            delta(Direction::Right),
        )
    }

    /// One toroidal step from `position`.
    pub fn step(&self, position: Position, direction: Direction) -> Position {
        position.stepped(direction, self.width, self.height)
    }

    /// Set the target food count, creating food if short of it.
    pub fn set_desired_food<R: Rng + ?Sized>(&mut self, desired: usize, rng: &mut R) {
        let created = self
            .food
            .set_desired(desired, self.width, self.height, rng);
        if created > 0 {
            debug!(created, desired, "generated food");
        }
        self.refresh_scent();
    }

    pub fn set_food_calories(&mut self, calories: u32) {
        self.food.set_calories(calories);
    }

    /// Place food at an exact cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PositionOutOfBounds`] if `position` is off the grid.
    pub fn place_food(&mut self, position: Position, calories: u32) -> Result<FoodId> {
        if !self.contains(position) {
            return Err(Error::PositionOutOfBounds {
                x: position.x as i64,
                y: position.y as i64,
                width: self.width,
                height: self.height,
            });
        }
        let id = self.food.push(position, calories);
        self.refresh_scent();
        Ok(id)
    }

    /// An agent reached food `id`: relocate or remove it and re-derive the scent.
    pub fn consume_food<R: Rng + ?Sized>(&mut self, id: FoodId, rng: &mut R) -> Option<FoodFate> {
        let fate = self.food.consume(id, self.width, self.height, rng)?;
        debug!(food = %id, ?fate, "food consumed");
        self.refresh_scent();
        Some(fate)
    }

    /// Remove all food and zero the target count.
    pub fn clear_food(&mut self) {
        let calories = self.food.calories();
        self.food = FoodSupply::new(0, calories);
        self.refresh_scent();
    }

    fn refresh_scent(&mut self) {
        self.scent.recompute(self.food.foods());
    }
}
