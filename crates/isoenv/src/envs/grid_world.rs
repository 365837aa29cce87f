//! A small deterministic grid environment.
//!
//! The agent starts in the top-left corner and must reach the bottom-right
//! corner. Observations are a one-hot `size x size` grid marking the agent's
//! position.

use serde_json::{Value, json};

use crate::env::{AttrLookup, EnvError, Environment};
use crate::space::{CallArgs, Space, StepOutcome};

const MOVES: [(i64, i64); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

pub struct GridWorld {
    size: usize,
    agent: (usize, usize),
    goal: (usize, usize),
    steps: u64,
    max_steps: u64,
    closed: bool,
}

impl GridWorld {
    pub const DEFAULT_SIZE: usize = 4;
    pub const DEFAULT_MAX_STEPS: u64 = 200;

    /// Create a `size x size` grid. Sizes below 2 are clamped to 2 so the
    /// start and goal cells stay distinct.
    pub fn new(size: usize) -> Self {
        let size = size.max(2);
        Self {
            size,
            agent: (0, 0),
            goal: (size - 1, size - 1),
            steps: 0,
            max_steps: Self::DEFAULT_MAX_STEPS,
            closed: false,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn observation(&self) -> Value {
        let grid: Vec<Vec<f64>> = (0..self.size)
            .map(|row| {
                (0..self.size)
                    .map(|col| if (row, col) == self.agent { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect();
        json!(grid)
    }

    fn distance_to_goal(&self) -> u64 {
        let dr = self.agent.0.abs_diff(self.goal.0);
        let dc = self.agent.1.abs_diff(self.goal.1);
        (dr + dc) as u64
    }
}

impl Environment for GridWorld {
    fn observation_space(&self) -> Space {
        Space::boxed(0.0, 1.0, [self.size, self.size])
    }

    fn action_space(&self) -> Space {
        Space::discrete(MOVES.len() as u64)
    }

    fn reset(&mut self) -> Result<Value, EnvError> {
        self.agent = (0, 0);
        self.steps = 0;
        Ok(self.observation())
    }

    fn step(&mut self, action: Value) -> Result<StepOutcome, EnvError> {
        let index = action
            .as_u64()
            .filter(|&a| (a as usize) < MOVES.len())
            .ok_or_else(|| EnvError::InvalidAction(action.to_string()))?;

        let (dr, dc) = MOVES[index as usize];
        let limit = (self.size - 1) as i64;
        let row = (self.agent.0 as i64 + dr).clamp(0, limit) as usize;
        let col = (self.agent.1 as i64 + dc).clamp(0, limit) as usize;
        self.agent = (row, col);
        self.steps += 1;

        let at_goal = self.agent == self.goal;
        let done = at_goal || self.steps >= self.max_steps;
        let reward = if at_goal { 1.0 } else { 0.0 };

        Ok(StepOutcome::new(self.observation(), reward, done)
            .with_info("steps", json!(self.steps)))
    }

    fn close(&mut self) -> Result<(), EnvError> {
        self.closed = true;
        Ok(())
    }

    fn attribute(&self, name: &str) -> AttrLookup {
        match name {
            "size" => AttrLookup::Value(json!(self.size)),
            "steps" => AttrLookup::Value(json!(self.steps)),
            "max_steps" => AttrLookup::Value(json!(self.max_steps)),
            "distance_to_goal" | "teleport" => AttrLookup::Callable,
            _ => AttrLookup::Missing,
        }
    }

    fn invoke(&mut self, name: &str, args: CallArgs) -> Result<Value, EnvError> {
        match name {
            "distance_to_goal" => Ok(json!(self.distance_to_goal())),
            "teleport" => {
                let coord = |i: usize| {
                    args.args
                        .get(i)
                        .and_then(|v| v.as_u64())
                        .map(|n| n as usize)
                        .filter(|&n| n < self.size)
                };
                let (row, col) = match (coord(0), coord(1)) {
                    (Some(row), Some(col)) => (row, col),
                    _ => {
                        return Err(EnvError::other(format!(
                            "teleport expects two in-bounds coordinates, got {:?}",
                            args.args
                        )));
                    }
                };
                self.agent = (row, col);
                Ok(self.observation())
            }
            _ => Err(EnvError::NoSuchMethod(name.to_string())),
        }
    }
}
