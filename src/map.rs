use anyhow::{anyhow, Context};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::common::{Point, Tile};
use crate::error::PathfindError;

/// Rectangular grid of tile codes, indexed by `(x, y)` with `x` the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Tile>>) -> Result<Self, PathfindError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        if height == 0 || width == 0 {
            return Err(PathfindError::Configuration(
                "grid must have at least one row and one column".to_string(),
            ));
        }
        if let Some(y) = rows.iter().position(|row| row.len() != width) {
            return Err(PathfindError::Configuration(format!(
                "grid row {y} has {} columns, expected {width}",
                rows[y].len()
            )));
        }

        Ok(Grid {
            width,
            height,
            tiles: rows.into_iter().flatten().collect(),
        })
    }

    /// Load a MovingAI benchmark map (`type`, `height`, `width`, `map` header
    /// followed by one glyph row per line).
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let file = File::open(path).with_context(|| format!("cannot open map file {path}"))?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let mut header = |name: &str| -> anyhow::Result<String> {
            lines
                .next()
                .ok_or_else(|| anyhow!("map file {path} ends before the `{name}` line"))?
                .map_err(Into::into)
        };

        let _type = header("type")?;
        let height = parse_dimension(&header("height")?, "height")?;
        let width = parse_dimension(&header("width")?, "width")?;
        let _map = header("map")?;

        let mut rows = Vec::with_capacity(height);
        for (y, line) in lines.take(height).enumerate() {
            let row = line?
                .trim_end()
                .chars()
                .map(tile_from_glyph)
                .collect::<Option<Vec<Tile>>>()
                .ok_or_else(|| anyhow!("unknown glyph in row {y} of {path}"))?;
            rows.push(row);
        }

        let grid = Grid::new(rows)?;
        if grid.width != width || grid.height != height {
            return Err(anyhow!(
                "map file {path} declares {width}x{height} but contains {}x{}",
                grid.width,
                grid.height
            ));
        }

        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    /// Tile code at `point`. Panics if the point is outside the grid.
    pub fn tile(&self, point: Point) -> Tile {
        self.tiles[point.y * self.width + point.x]
    }

    /// Every distinct tile code present in the grid.
    pub fn tile_codes(&self) -> BTreeSet<Tile> {
        self.tiles.iter().copied().collect()
    }

    pub(crate) fn bounds_check(&self, x: usize, y: usize) -> Result<(), PathfindError> {
        if x < self.width && y < self.height {
            Ok(())
        } else {
            Err(PathfindError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }
}

fn parse_dimension(line: &str, name: &str) -> anyhow::Result<usize> {
    line.split_whitespace()
        .last()
        .ok_or_else(|| anyhow!("missing {name} value"))?
        .parse::<usize>()
        .with_context(|| format!("invalid {name} line: {line}"))
}

fn tile_from_glyph(glyph: char) -> Option<Tile> {
    match glyph {
        '.' | 'G' => Some(0),
        '@' | 'O' => Some(1),
        'S' => Some(2),
        'T' => Some(3),
        'W' => Some(4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_map() {
        let grid = Grid::from_file("map_file/test/test.map").unwrap();

        assert_eq!(grid.width(), 8);
        assert_eq!(grid.height(), 6);

        assert_eq!(grid.tile(Point::new(0, 0)), 1);
        assert_eq!(grid.tile(Point::new(1, 1)), 0);
        assert_eq!(grid.tile(Point::new(3, 1)), 1);
        assert_eq!(grid.tile(Point::new(5, 4)), 3);
        assert_eq!(grid.tile_codes(), BTreeSet::from([0, 1, 3]));
    }

    #[test]
    fn test_missing_map_file() {
        assert!(Grid::from_file("map_file/test/missing.map").is_err());
    }

    #[test]
    fn test_reject_ragged_grid() {
        let result = Grid::new(vec![vec![0, 0, 0], vec![0, 0]]);
        assert!(matches!(result, Err(PathfindError::Configuration(_))));
        assert!(Grid::new(vec![]).is_err());
        assert!(Grid::new(vec![vec![]]).is_err());
    }

    #[test]
    fn test_bounds() {
        let grid = Grid::new(vec![vec![0, 1], vec![2, 3], vec![4, 5]]).unwrap();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.tile(Point::new(1, 2)), 5);
        assert!(grid.contains(Point::new(1, 2)));
        assert!(!grid.contains(Point::new(2, 0)));
        assert_eq!(
            grid.bounds_check(0, 3),
            Err(PathfindError::OutOfBounds {
                x: 0,
                y: 3,
                width: 2,
                height: 3
            })
        );
    }
}
