use glam::IVec3;
use tracing::{debug, trace};

use crate::runtime::maze::Maze;
use crate::runtime::value::Cell;

/// The six axis-aligned directions a robot can move or measure in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Forward,
    Back,
}

impl Direction {
    /// Unit step in grid coordinates.
    pub fn offset(self) -> IVec3 {
        match self {
            Self::Forward => IVec3::X,
            Self::Back    => IVec3::NEG_X,
            Self::Right   => IVec3::Y,
            Self::Left    => IVec3::NEG_Y,
            Self::Up      => IVec3::Z,
            Self::Down    => IVec3::NEG_Z,
        }
    }

    pub fn move_symbol(self) -> &'static str {
        match self {
            Self::Up      => "^_^",
            Self::Down    => "v_v",
            Self::Left    => "<_<",
            Self::Right   => ">_>",
            Self::Forward => "o_o",
            Self::Back    => "~_~",
        }
    }

    pub fn measure_symbol(self) -> &'static str {
        match self {
            Self::Up      => "^_0",
            Self::Down    => "v_0",
            Self::Left    => "<_0",
            Self::Right   => ">_0",
            Self::Forward => "o_0",
            Self::Back    => "~_0",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────

/// A robot inside a maze. A move into a wall or off the grid crashes it;
/// from then on moves are ignored and every measurement reads zero.
#[derive(Debug, Clone)]
pub struct Robot {
    maze: Maze,
    position: IVec3,
    crashed: bool,
}

impl Robot {
    /// Places the robot on the maze's start cell.
    pub fn new(maze: Maze) -> Self {
        let position = maze.start();
        Self { maze, position, crashed: false }
    }

    /// Places the robot at an arbitrary position. An out-of-bounds or
    /// blocked position is accepted; the first move from it decides.
    pub fn at(maze: Maze, position: IVec3) -> Self {
        Self { maze, position, crashed: false }
    }

    pub fn is_crashed(&self) -> bool {
        self.crashed
    }

    pub fn coords(&self) -> IVec3 {
        self.position
    }

    pub fn position(&self) -> Cell {
        Cell::new(self.position, false)
    }

    pub fn step(&mut self, dir: Direction) {
        if self.crashed {
            trace!(?dir, "move ignored, robot has crashed");
            return;
        }
        let target = self.position + dir.offset();
        if self.maze.is_free(target) {
            trace!(from = %self.position, to = %target, "robot moved");
            self.position = target;
        } else {
            debug!(at = %self.position, ?dir, "robot crashed");
            self.crashed = true;
        }
    }

    /// Number of free cells in `dir` before the first wall or the grid edge.
    pub fn measure(&self, dir: Direction) -> i64 {
        if self.crashed {
            return 0;
        }
        let step = dir.offset();
        let mut cursor = self.position + step;
        let mut distance = 0;
        while self.maze.is_free(cursor) {
            distance += 1;
            cursor += step;
        }
        distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maze() -> Maze {
        "3 3 1\n000\n010\n000\n1\n2 2 0\n0 0 0".parse().expect("maze")
    }

    #[test]
    fn starts_on_the_start_cell() {
        let robot = Robot::new(maze());
        assert_eq!(robot.coords(), IVec3::ZERO);
        assert!(!robot.is_crashed());
    }

    #[test]
    fn measure_forward_from_start() {
        let robot = Robot::new(maze());
        assert_eq!(robot.measure(Direction::Forward), 2);
        assert_eq!(robot.measure(Direction::Right), 2);
        assert_eq!(robot.measure(Direction::Back), 0);
        assert_eq!(robot.measure(Direction::Up), 0);
    }

    #[test]
    fn measure_does_not_move() {
        let robot = Robot::new(maze());
        robot.measure(Direction::Forward);
        assert_eq!(robot.coords(), IVec3::ZERO);
    }

    #[test]
    fn step_moves_along_axis() {
        let mut robot = Robot::new(maze());
        robot.step(Direction::Forward);
        assert_eq!(robot.coords(), IVec3::new(1, 0, 0));
        robot.step(Direction::Back);
        robot.step(Direction::Right);
        assert_eq!(robot.coords(), IVec3::new(0, 1, 0));
    }

    #[test]
    fn moving_into_a_wall_crashes_in_place() {
        let mut robot = Robot::new(maze());
        robot.step(Direction::Forward);
        robot.step(Direction::Right);
        assert!(robot.is_crashed());
        assert_eq!(robot.coords(), IVec3::new(1, 0, 0));
    }

    #[test]
    fn moving_off_the_grid_crashes() {
        let mut robot = Robot::new(maze());
        robot.step(Direction::Down);
        assert!(robot.is_crashed());
        assert_eq!(robot.coords(), IVec3::ZERO);
    }

    #[test]
    fn crashed_robot_ignores_moves_and_reads_zero() {
        let mut robot = Robot::new(maze());
        robot.step(Direction::Back);
        robot.step(Direction::Forward);
        assert_eq!(robot.coords(), IVec3::ZERO);
        assert_eq!(robot.measure(Direction::Forward), 0);
    }

    #[test]
    fn position_is_a_free_cell() {
        let robot = Robot::at(maze(), IVec3::new(2, 2, 0));
        assert_eq!(robot.position(), Cell::new(IVec3::new(2, 2, 0), false));
    }

    #[test]
    fn offsets_are_opposite_pairs() {
        assert_eq!(Direction::Up.offset(), -Direction::Down.offset());
        assert_eq!(Direction::Left.offset(), -Direction::Right.offset());
        assert_eq!(Direction::Forward.offset(), -Direction::Back.offset());
    }
}
