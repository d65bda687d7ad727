use overrun_protocol::{FieldId, PlayerColor};

/// One cell of the grid. `owner` is a denormalized cache of the
/// authoritative relation, the owning player's field set; it is only
/// written through `Game::claim`.
#[derive(Clone, Debug)]
pub struct Field {
    pub id: FieldId,
    pub row: u32,
    pub col: u32,
    /// 0 exactly when the cell is unowned.
    pub value: u32,
    pub owner: Option<PlayerColor>,
    neighbors: Vec<FieldId>,
}

impl Field {
    /// Adjacent cells in the fixed order left, right, up, down (edges
    /// omitted). Cascade resolution depends on this order.
    pub fn neighbors(&self) -> &[FieldId] {
        &self.neighbors
    }

    pub fn neighbor_count(&self) -> u32 {
        self.neighbors.len() as u32
    }
}

/// The `size` x `size` grid, cells stored row-major so a `FieldId`
/// doubles as an index.
#[derive(Clone, Debug)]
pub struct Board {
    size: u32,
    fields: Vec<Field>,
}

impl Board {
    pub fn new(size: u32) -> Self {
        let mut fields = Vec::with_capacity((size * size) as usize);
        for row in 0..size {
            for col in 0..size {
                fields.push(Field {
                    id: FieldId::new(row * size + col),
                    row,
                    col,
                    value: 0,
                    owner: None,
                    neighbors: Vec::new(),
                });
            }
        }
        for field in fields.iter_mut() {
            field.neighbors = compute_neighbors(size, field.row, field.col);
        }
        Self { size, fields }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.fields.get_mut(id.index())
    }

    pub fn field_at(&self, row: u32, col: u32) -> Option<&Field> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.fields.get((row * self.size + col) as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }
}

/// Pure in the grid size and the cell's coordinates; called once per
/// cell right after the grid is built. Corners get 2 neighbors, edges 3,
/// interior cells 4.
fn compute_neighbors(size: u32, row: u32, col: u32) -> Vec<FieldId> {
    let mut neighbors = Vec::with_capacity(4);
    if col > 0 {
        neighbors.push(FieldId::new(row * size + col - 1));
    }
    if col + 1 < size {
        neighbors.push(FieldId::new(row * size + col + 1));
    }
    if row > 0 {
        neighbors.push(FieldId::new((row - 1) * size + col));
    }
    if row + 1 < size {
        neighbors.push(FieldId::new((row + 1) * size + col));
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ids_are_row_major() {
        let board = Board::new(4);
        let field = board.field_at(2, 3).unwrap();
        assert_eq!(field.id, FieldId::new(11));
        assert_eq!((field.row, field.col), (2, 3));
        assert!(board.field_at(4, 0).is_none());
    }

    #[test]
    fn neighbor_order_is_left_right_up_down() {
        let board = Board::new(4);
        // Interior cell (1,1) = id 5.
        let field = board.get(FieldId::new(5)).unwrap();
        assert_eq!(
            field.neighbors(),
            &[
                FieldId::new(4), // left
                FieldId::new(6), // right
                FieldId::new(1), // up
                FieldId::new(9), // down
            ]
        );
    }

    #[test]
    fn corner_and_edge_counts() {
        let board = Board::new(4);
        assert_eq!(board.get(FieldId::new(0)).unwrap().neighbor_count(), 2);
        assert_eq!(board.get(FieldId::new(1)).unwrap().neighbor_count(), 3);
        assert_eq!(board.get(FieldId::new(5)).unwrap().neighbor_count(), 4);
        assert_eq!(board.get(FieldId::new(15)).unwrap().neighbor_count(), 2);
    }

    proptest! {
        /// B is a neighbor of A exactly when A is a neighbor of B.
        #[test]
        fn neighbors_are_symmetric(size in 2u32..12) {
            let board = Board::new(size);
            for field in board.iter() {
                for &n in field.neighbors() {
                    let back = board.get(n).unwrap();
                    prop_assert!(back.neighbors().contains(&field.id));
                }
            }
        }

        #[test]
        fn every_cell_has_two_to_four_neighbors(size in 2u32..12) {
            let board = Board::new(size);
            for field in board.iter() {
                let count = field.neighbor_count();
                prop_assert!((2..=4).contains(&count));
            }
        }
    }
}
