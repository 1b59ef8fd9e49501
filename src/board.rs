//! Board rasterization and ASCII rendering.

use crate::model::Placement;

/// Cyclic symbol table for box ids >= 10, indexed by `id % 10`. Deliberately
/// lossy visual aliasing for large id spaces, not a uniqueness guarantee.
const OVERFLOW_SYMBOLS: [char; 10] = ['+', '*', '#', 'o', 'a', 'b', 'c', 'd', 'e', 'f'];

/// Width of the row-label gutter in rendered output.
const LABEL_WIDTH: usize = 3;

/// A `width x height` grid of optional box-id cells.
///
/// Built fresh per rendered answer and discarded after rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Column-major cells: `(x, y)` lives at `x * height + y`, 0-based.
    cells: Vec<Option<u32>>,
}

impl Board {
    /// Overlay each placement's square footprint onto an empty grid.
    ///
    /// Placements are applied in input order; later placements overwrite
    /// earlier marks at overlapping cells. `(x, y)` is the piece's lower
    /// corner in 1-based coordinates. Footprints extending outside the grid
    /// are a defect and panic on the out-of-range cell index.
    pub fn from_placements(placements: &[Placement], width: u32, height: u32) -> Board {
        let (width, height) = (width as usize, height as usize);
        let mut cells = vec![None; width * height];
        for p in placements {
            for i in 0..p.side_len as usize {
                for j in 0..p.side_len as usize {
                    let x = p.x as usize + i - 1;
                    let y = p.y as usize + j - 1;
                    assert!(x < width && y < height, "placement outside board: {p:?}");
                    cells[x * height + y] = Some(p.box_id);
                }
            }
        }
        Board {
            width,
            height,
            cells,
        }
    }

    fn cell(&self, x: usize, y: usize) -> Option<u32> {
        self.cells[x * self.height + y]
    }

    /// Render a fixed-width ASCII diagram of the board.
    ///
    /// Rows are printed in descending y (top row = highest coordinate) with a
    /// 3-character label gutter and one character per column between vertical
    /// bars. Ids 0-9 print literally; larger ids go through the cyclic
    /// symbol table.
    pub fn render(&self) -> String {
        let border = format!(
            "{}+{}+",
            " ".repeat(LABEL_WIDTH),
            "-".repeat((2 * self.width).saturating_sub(1))
        );
        let mut s = String::new();
        s.push_str(&border);
        s.push('\n');
        for y in (1..=self.height).rev() {
            s.push_str(&format!("{y:<LABEL_WIDTH$}|"));
            for x in 0..self.width {
                match self.cell(x, y - 1) {
                    None => s.push(' '),
                    Some(id) if id < 10 => {
                        s.push(char::from_digit(id, 10).unwrap_or('?'));
                    }
                    Some(id) => s.push(OVERFLOW_SYMBOLS[(id % 10) as usize]),
                }
                s.push('|');
            }
            s.push('\n');
        }
        s.push_str(&border);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(box_id: u32, side_len: u32, x: u32, y: u32) -> Placement {
        Placement {
            box_id,
            side_len,
            x,
            y,
        }
    }

    #[test]
    fn renders_example_board() {
        let board =
            Board::from_placements(&[placement(1, 2, 1, 1), placement(2, 1, 3, 3)], 4, 4);
        let expected = "   +-------+
4  | | | | |
3  | | |2| |
2  |1|1| | |
1  |1|1| | |
   +-------+";
        assert_eq!(board.render(), expected);
    }

    #[test]
    fn decode_rasterize_render_is_deterministic() {
        let line = "move(1,right,3) finalPos(1,2,1,1) finalPos(2,1,3,3) boardX(4) boardY(4)";
        let render = |s: &str| {
            let answer = crate::decode::parse_answer(s).unwrap();
            Board::from_placements(&answer.placements, answer.width, answer.height).render()
        };
        assert_eq!(render(line), render(line));
    }

    #[test]
    fn render_is_idempotent() {
        let board = Board::from_placements(&[placement(3, 2, 2, 2)], 5, 5);
        assert_eq!(board.render(), board.render());
    }

    #[test]
    fn later_placements_overwrite_earlier_ones() {
        let board =
            Board::from_placements(&[placement(1, 2, 1, 1), placement(2, 1, 1, 1)], 2, 2);
        assert_eq!(board.cell(0, 0), Some(2));
        assert_eq!(board.cell(1, 1), Some(1));
    }

    #[test]
    fn footprint_touching_the_edge_is_in_range() {
        let board = Board::from_placements(&[placement(1, 2, 3, 3)], 4, 4);
        assert_eq!(board.cell(3, 3), Some(1));
    }

    #[test]
    #[should_panic(expected = "placement outside board")]
    fn footprint_past_the_edge_panics() {
        Board::from_placements(&[placement(1, 2, 4, 4)], 4, 4);
    }

    #[test]
    fn large_ids_alias_through_symbol_table() {
        let board = Board::from_placements(
            &[placement(10, 1, 1, 1), placement(12, 1, 2, 1), placement(19, 1, 3, 1)],
            3,
            1,
        );
        assert_eq!(
            board.render(),
            "   +-----+\n1  |+|#|f|\n   +-----+"
        );
    }
}
