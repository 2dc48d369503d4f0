use anyhow::{bail, Context};
use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};
use util::Grid;

use crate::{Dir, Element, Properties};

/// Id shared by all background (empty/dirt) cells.
pub const BACKGROUND_ID: u32 = 1;

/// One board cell: a hidden kind plus its identity.
///
/// Background cells all carry [`BACKGROUND_ID`]; every other cell carries an
/// id minted at its birth and kept for as long as it only moves or changes
/// flavor in place.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub kind: Element,
    pub id: u32,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            kind: Element::Empty,
            id: BACKGROUND_ID,
        }
    }
}

/// Header fields of an initial-grid string.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct MapHeader {
    pub cols: usize,
    pub rows: usize,
    /// Tick budget; zero or negative means unbounded.
    pub max_steps: i64,
    /// Diamonds needed before the exit opens.
    pub gems_required: u32,
}

/// The grid store: one kind and one id per cell, plus the per-tick
/// `has_updated` bookkeeping that keeps the scan from double-stepping an
/// element.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Board {
    cells: Grid<Cell>,
    updated: Grid<bool>,
    id_counter: u32,
}

impl Board {
    /// Parse an initial-grid string.
    ///
    /// Line 1 is `cols, rows, max_steps, gems_required`; the remaining
    /// `rows` lines hold `cols` hidden cell ids each. The field delimiter
    /// is `,` when the text contains a comma anywhere, `|` otherwise.
    pub fn parse(text: &str) -> anyhow::Result<(Board, MapHeader)> {
        let sep = if text.contains(',') { ',' } else { '|' };
        let mut lines = text.lines();

        let header: Vec<i64> = lines
            .next()
            .context("empty grid string")?
            .split(sep)
            .map(|s| s.trim().parse::<i64>().context("malformed header"))
            .collect::<anyhow::Result<_>>()?;
        let &[cols, rows, max_steps, gems_required] = header.as_slice()
        else {
            bail!("header must have 4 fields, got {}", header.len());
        };
        if cols <= 0 || rows <= 0 {
            bail!("bad grid dimensions {cols}x{rows}");
        }
        if gems_required < 0 {
            bail!("negative gems_required {gems_required}");
        }
        let (cols, rows) = (cols as usize, rows as usize);

        let mut board = Board {
            cells: Grid::new(cols, rows),
            updated: Grid::new(cols, rows),
            id_counter: BACKGROUND_ID,
        };

        let mut r = 0;
        for line in lines {
            if r >= rows {
                bail!("too many grid rows, expected {rows}");
            }
            let mut c = 0;
            for field in line.split(sep) {
                if c >= cols {
                    bail!("row {r} has more than {cols} cells");
                }
                let id = field
                    .trim()
                    .parse::<i64>()
                    .with_context(|| format!("bad cell at ({r}, {c})"))?;
                let kind = Element::from_channel(id)
                    .with_context(|| format!("bad cell at ({r}, {c})"))?;
                let id = if kind.is_background() {
                    BACKGROUND_ID
                } else {
                    board.mint()
                };
                board.cells[ivec2(c as i32, r as i32)] = Cell { kind, id };
                c += 1;
            }
            if c != cols {
                bail!("row {r} has {c} cells, expected {cols}");
            }
            r += 1;
        }
        if r != rows {
            bail!("grid has {r} rows, expected {rows}");
        }

        log::debug!("parsed {cols}x{rows} board, {} ids", board.id_counter);

        let header = MapHeader {
            cols,
            rows,
            max_steps,
            gems_required: gems_required as u32,
        };
        Ok((board, header))
    }

    pub fn cols(&self) -> usize {
        self.cells.width() as usize
    }

    pub fn rows(&self) -> usize {
        self.cells.height() as usize
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        self.cells.contains(pos)
    }

    /// Cell at a position that is known to be in bounds.
    pub fn cell(&self, pos: IVec2) -> Cell {
        self.cells[pos]
    }

    pub fn element(&self, pos: IVec2) -> Element {
        self.cells[pos].kind
    }

    pub fn id(&self, pos: IVec2) -> u32 {
        self.cells[pos].id
    }

    /// Cell one step toward `dir`, or `None` when that is off the board.
    pub fn neighbor(&self, pos: IVec2, dir: Dir) -> Option<Cell> {
        self.cells.get(pos + dir.offset()).copied()
    }

    /// Does the cell toward `dir` hold the given kind? Out of bounds reads
    /// as "no", which makes the board edge behave as a blocker.
    pub fn matches(&self, pos: IVec2, dir: Dir, kind: Element) -> bool {
        self.neighbor(pos, dir).is_some_and(|c| c.kind == kind)
    }

    /// Does the cell toward `dir` have all the given property flags?
    pub fn has_property(
        &self,
        pos: IVec2,
        dir: Dir,
        props: Properties,
    ) -> bool {
        self.neighbor(pos, dir)
            .is_some_and(|c| c.kind.properties().contains(props))
    }

    /// Mint a fresh cell id.
    pub fn mint(&mut self) -> u32 {
        self.id_counter += 1;
        self.id_counter
    }

    /// Overwrite a cell in place and mark it updated for this tick.
    pub fn set(&mut self, pos: IVec2, kind: Element, id: u32) {
        debug_assert!(!kind.is_background() || id == BACKGROUND_ID);
        self.cells[pos] = Cell { kind, id };
        self.updated[pos] = true;
    }

    /// Move the occupant one step toward `dir`, leaving empty background
    /// behind. The occupant keeps its id; any prior occupant of the target
    /// is destroyed. The target is marked updated.
    pub fn shift(&mut self, pos: IVec2, dir: Dir) {
        let target = pos + dir.offset();
        debug_assert!(self.contains(target), "shift off the board");
        self.cells[target] = self.cells[pos];
        self.cells[pos] = Cell::default();
        self.updated[target] = true;
    }

    pub fn was_updated(&self, pos: IVec2) -> bool {
        self.updated[pos]
    }

    /// Start-of-tick bookkeeping.
    pub fn clear_updated(&mut self) {
        self.updated.clear();
    }

    /// Position of the first cell of the given kind in scan order.
    pub fn locate(&self, kind: Element) -> Option<IVec2> {
        self.cells
            .iter()
            .find_map(|(pos, c)| (c.kind == kind).then_some(pos))
    }

    /// All positions holding the given kind, in scan order.
    pub fn all_of(&self, kind: Element) -> Vec<IVec2> {
        self.cells
            .iter()
            .filter_map(|(pos, c)| (c.kind == kind).then_some(pos))
            .collect()
    }

    pub fn exists(&self, kind: Element) -> bool {
        self.locate(kind).is_some()
    }

    /// Iterate all positions in scan order (top to bottom, left to right).
    pub fn scan_order(&self) -> impl Iterator<Item = IVec2> {
        let (cols, rows) = (self.cols() as i32, self.rows() as i32);
        (0..rows).flat_map(move |r| (0..cols).map(move |c| ivec2(c, r)))
    }
}
