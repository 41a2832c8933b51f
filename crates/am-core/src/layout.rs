//! Placement policies for nodes that have no `x,y,Label` line.
//!
//! A policy is passed into the parser explicitly and carries its own running
//! offset, so parsing the same text twice with fresh policies yields the
//! same positions. This is not a layout engine: nodes are stacked or gridded
//! in first-mention order and nothing is optimized.

use crate::id::NodeId;
use crate::model::Position;

/// The canvas (viewport) dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Chooses a position for each node the text doesn't place.
pub trait Placement {
    fn place(&mut self, id: NodeId) -> Position;

    /// How many nodes this policy has placed so far.
    fn placed(&self) -> usize;
}

/// Stacks nodes in a single column.
#[derive(Debug, Clone)]
pub struct StackPlacement {
    pub origin: Position,
    pub step: i64,
    next: usize,
}

impl StackPlacement {
    pub fn new(origin: Position, step: i64) -> Self {
        Self {
            origin,
            step,
            next: 0,
        }
    }
}

impl Default for StackPlacement {
    fn default() -> Self {
        Self::new(Position::new(50, 50), 70)
    }
}

impl Placement for StackPlacement {
    fn place(&mut self, _id: NodeId) -> Position {
        let pos = Position::new(self.origin.x, self.origin.y + self.step * self.next as i64);
        self.next += 1;
        pos
    }

    fn placed(&self) -> usize {
        self.next
    }
}

/// Fills a row-major grid sized to the viewport.
#[derive(Debug, Clone)]
pub struct GridPlacement {
    pub origin: Position,
    pub cell_width: i64,
    pub cell_height: i64,
    pub columns: usize,
    next: usize,
}

impl GridPlacement {
    pub const CELL_WIDTH: i64 = 200;
    pub const CELL_HEIGHT: i64 = 100;

    pub fn new(origin: Position, cell_width: i64, cell_height: i64, columns: usize) -> Self {
        Self {
            origin,
            cell_width,
            cell_height,
            columns: columns.max(1),
            next: 0,
        }
    }

    /// As many default-sized columns as fit across the viewport (at least one).
    pub fn for_viewport(viewport: Viewport) -> Self {
        let columns = (viewport.width / Self::CELL_WIDTH as f32).floor() as usize;
        Self::new(
            Position::new(0, 0),
            Self::CELL_WIDTH,
            Self::CELL_HEIGHT,
            columns,
        )
    }
}

impl Placement for GridPlacement {
    fn place(&mut self, _id: NodeId) -> Position {
        let col = (self.next % self.columns) as i64;
        let row = (self.next / self.columns) as i64;
        self.next += 1;
        Position::new(
            self.origin.x + col * self.cell_width,
            self.origin.y + row * self.cell_height,
        )
    }

    fn placed(&self) -> usize {
        self.next
    }
}

/// Which placement policy a sync session builds for each parse.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PlacementConfig {
    #[default]
    Stack,
    Grid(Viewport),
}

impl PlacementConfig {
    /// A fresh policy, starting from offset zero.
    pub fn build(&self) -> Box<dyn Placement> {
        match self {
            PlacementConfig::Stack => Box::new(StackPlacement::default()),
            PlacementConfig::Grid(viewport) => Box::new(GridPlacement::for_viewport(*viewport)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_places_vertically() {
        let mut stack = StackPlacement::default();
        let id = NodeId::intern("n");
        assert_eq!(stack.place(id), Position::new(50, 50));
        assert_eq!(stack.place(id), Position::new(50, 120));
        assert_eq!(stack.placed(), 2);
    }

    #[test]
    fn grid_wraps_at_viewport_width() {
        let mut grid = GridPlacement::for_viewport(Viewport {
            width: 450.0,
            height: 300.0,
        });
        assert_eq!(grid.columns, 2);
        let id = NodeId::intern("n");
        let placed: Vec<_> = (0..3).map(|_| grid.place(id)).collect();
        assert_eq!(
            placed,
            vec![
                Position::new(0, 0),
                Position::new(200, 0),
                Position::new(0, 100)
            ]
        );
    }

    #[test]
    fn narrow_viewport_still_has_one_column() {
        let grid = GridPlacement::for_viewport(Viewport {
            width: 10.0,
            height: 10.0,
        });
        assert_eq!(grid.columns, 1);
    }

    #[test]
    fn built_policies_start_fresh() {
        let config = PlacementConfig::Stack;
        let mut first = config.build();
        first.place(NodeId::intern("x"));
        assert_eq!(config.build().placed(), 0);
    }
}
