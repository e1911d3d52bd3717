use std::str::FromStr;

use glam::IVec3;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("line {line}: expected {expected}, found `{found}`")]
    Malformed { line: usize, expected: &'static str, found: String },
    #[error("line {line}: layer row has {found} cells, expected {expected}")]
    RowWidth { line: usize, expected: usize, found: usize },
    #[error("line {line}: cell must be `0` or `1`, found `{found}`")]
    BadCell { line: usize, found: char },
    #[error("grid has {found} cells, expected {expected}")]
    CellCount { expected: usize, found: usize },
    #[error("dimensions must be positive, got {0}x{1}x{2}")]
    EmptyGrid(i32, i32, i32),
    #[error("a {0}x{1}x{2} grid is too large")]
    TooLarge(i32, i32, i32),
    #[error("start position {0} is outside the maze or blocked")]
    BadStart(IVec3),
}

/// A `width × height × depth` grid of free and blocked cells.
///
/// Cells are stored layer by layer (`z`), row by row (`y`), then `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Maze {
    size: IVec3,
    blocked: Vec<bool>,
    exits: Vec<IVec3>,
    start: IVec3,
}

impl Maze {
    pub fn new(size: IVec3, blocked: Vec<bool>, exits: Vec<IVec3>, start: IVec3) -> Result<Self, MazeError> {
        let expected = cell_count(size)?;
        if blocked.len() != expected {
            return Err(MazeError::CellCount { expected, found: blocked.len() });
        }
        let maze = Self { size, blocked, exits, start };
        if !maze.is_free(start) {
            return Err(MazeError::BadStart(start));
        }
        Ok(maze)
    }

    pub fn size(&self) -> IVec3 {
        self.size
    }

    pub fn start(&self) -> IVec3 {
        self.start
    }

    /// Goal cells. Carried along for callers; the interpreter never checks them.
    pub fn exits(&self) -> &[IVec3] {
        &self.exits
    }

    pub fn in_bounds(&self, p: IVec3) -> bool {
        p.cmpge(IVec3::ZERO).all() && p.cmplt(self.size).all()
    }

    pub fn is_free(&self, p: IVec3) -> bool {
        self.index(p).is_some_and(|i| !self.blocked[i])
    }

    fn index(&self, p: IVec3) -> Option<usize> {
        if !self.in_bounds(p) {
            return None;
        }
        let [x, y, z] = p.to_array().map(|n| n as usize);
        let [w, h, _] = self.size.to_array().map(|n| n as usize);
        Some((z * h + y) * w + x)
    }
}

/// Number of cells in a grid of `size`, checked against `usize` overflow.
fn cell_count(size: IVec3) -> Result<usize, MazeError> {
    if size.min_element() <= 0 {
        return Err(MazeError::EmptyGrid(size.x, size.y, size.z));
    }
    let [w, h, d] = size.to_array().map(|n| n as usize);
    w.checked_mul(h)
        .and_then(|n| n.checked_mul(d))
        .ok_or(MazeError::TooLarge(size.x, size.y, size.z))
}

impl FromStr for Maze {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let (line, header) = lines.next().ok_or(MazeError::Missing("header"))?;
        let size = parse_triple(line, header, "`width height depth`")?;
        let cells = cell_count(size)?;

        let width = size.x as usize;
        let mut blocked = Vec::new();
        for _ in 0..cells / width {
            let (line, row) = lines.next().ok_or(MazeError::Missing("layer row"))?;
            let count = row.chars().count();
            if count != width {
                return Err(MazeError::RowWidth { line, expected: width, found: count });
            }
            for c in row.chars() {
                match c {
                    '0' => blocked.push(false),
                    '1' => blocked.push(true),
                    other => return Err(MazeError::BadCell { line, found: other }),
                }
            }
        }

        let (line, count) = lines.next().ok_or(MazeError::Missing("exit count"))?;
        let count: usize = count.parse().map_err(|_| MazeError::Malformed {
            line,
            expected: "an exit count",
            found: count.to_string(),
        })?;

        let mut exits = Vec::with_capacity(count);
        for _ in 0..count {
            let (line, text) = lines.next().ok_or(MazeError::Missing("exit position"))?;
            exits.push(parse_triple(line, text, "`x y z`")?);
        }

        let (line, text) = lines.next().ok_or(MazeError::Missing("start position"))?;
        let start = parse_triple(line, text, "`x y z`")?;

        Maze::new(size, blocked, exits, start)
    }
}

fn parse_triple(line: usize, text: &str, expected: &'static str) -> Result<IVec3, MazeError> {
    let malformed = || MazeError::Malformed { line, expected, found: text.to_string() };
    let parts = text
        .split_whitespace()
        .map(|p| p.parse::<i32>().map_err(|_| malformed()))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(IVec3::new(*x, *y, *z)),
        _ => Err(malformed()),
    }
}
