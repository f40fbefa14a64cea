use std::cmp;
use std::fmt;
use std::rc::Rc;
use std::slice;
use std::u32;

use error_chain::bail;
use petgraph::graph::{self, NodeIndex};
use petgraph::{Graph, Undirected};
use rand::Rng;

use crate::cells::{CellContents, CellState, CompassPrimary, Coordinate, CoordinateSmallVec,
                   OccupantId, COMPASS_PRIMARY_DIRECTIONS};
use crate::errors::*;
use crate::grid_displays::GridDisplay;
use crate::units::{EdgesCount, Height, NodesCount, Width};

/// The cell graph of a maze.
///
/// Grid adjacency is implied by the dimensions and never changes. Connectivity ("no wall
/// between these two cells") is an undirected graph whose node indices are the row major cell
/// indices. Connectivity only ever grows: there is no way to remove a link.
pub struct Grid {
    graph: Graph<(), (), Undirected, u32>,
    width: Width,
    height: Height,
    cells: Vec<CellState>,
    grid_display: Option<Rc<dyn GridDisplay>>,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid :: graph: {:?}, width: {:?}, height: {:?}",
               self.graph, self.width, self.height)
    }
}

impl Grid {
    /// Create a grid of unlinked, empty cells.
    pub fn new(width: Width, height: Height) -> Result<Grid> {
        let (Width(w), Height(h)) = (width, height);
        // Coordinates are u32 and so are the graph indices, the maximum index being reserved.
        let representable = w.checked_mul(h).map_or(false, |size| size < u32::MAX as usize);
        if w == 0 || h == 0 || !representable {
            bail!(ErrorKind::InvalidDimensions(w, h));
        }

        let (NodesCount(nodes), EdgesCount(edges)) = graph_size(width, height);
        let mut graph = Graph::with_capacity(nodes, edges);
        for _ in 0..nodes {
            let _ = graph.add_node(());
        }

        Ok(Grid {
            graph,
            width,
            height,
            cells: vec![CellState::default(); nodes],
            grid_display: None,
        })
    }

    #[inline]
    pub fn set_grid_display(&mut self, grid_display: Option<Rc<dyn GridDisplay>>) {
        self.grid_display = grid_display;
    }

    #[inline]
    pub fn grid_display(&self) -> &Option<Rc<dyn GridDisplay>> {
        &self.grid_display
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Height {
        self.height
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn links_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Pick any cell of the grid with equal probability.
    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> Coordinate {
        let index = rng.gen_range(0..self.size());
        self.index_to_coordinate(index)
    }

    /// The cell nearest to a world space position, where cell centres sit on whole numbers.
    /// Returns None if the nearest cell would lie outside of the grid.
    pub fn closest_cell(&self, x: f32, y: f32) -> Option<Coordinate> {
        let (rx, ry) = (x.round(), y.round());
        if !(rx >= 0.0 && ry >= 0.0 && rx <= u32::MAX as f32 && ry <= u32::MAX as f32) {
            return None;
        }
        let coord = Coordinate::new(rx as u32, ry as u32);
        if self.is_valid_coordinate(coord) {
            Some(coord)
        } else {
            None
        }
    }

    /// Link two grid neighbours, removing the wall between them. Linking an already linked pair
    /// changes nothing.
    pub fn link(&mut self, a: Coordinate, b: Coordinate) -> Result<()> {
        let a_index = self.graph_index(a).ok_or(ErrorKind::InvalidCoordinate(a))?;
        let b_index = self.graph_index(b).ok_or(ErrorKind::InvalidCoordinate(b))?;
        if !self.is_neighbour(a, b) {
            bail!(ErrorKind::NotNeighbours(a, b));
        }
        let _ = self.graph.update_edge(a_index, b_index, ());
        Ok(())
    }

    /// Cells that are linked to a particular cell by a passage.
    /// Returns None if the coordinate is invalid.
    pub fn links(&self, coord: Coordinate) -> Option<CoordinateSmallVec> {
        self.coordinate_to_index(coord).map(|index| {
            self.link_indices(index)
                .map(|linked_index| self.index_to_coordinate(linked_index))
                .collect()
        })
    }

    /// Row major indices of the cells linked to the cell at `index`, in the graph's own order.
    #[inline]
    pub(crate) fn link_indices(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph.neighbors(NodeIndex::new(index)).map(|node| node.index())
    }

    /// Cells to the North, South, East or West of a particular cell, but not necessarily linked
    /// by a passage.
    pub fn neighbours(&self, coord: Coordinate) -> CoordinateSmallVec {
        COMPASS_PRIMARY_DIRECTIONS.iter()
            .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
            .collect()
    }

    pub fn neighbour_at_direction(&self,
                                  coord: Coordinate,
                                  direction: CompassPrimary)
                                  -> Option<Coordinate> {
        coord.offset(direction).and_then(|neighbour_coord| {
            if self.is_valid_coordinate(neighbour_coord) {
                Some(neighbour_coord)
            } else {
                None
            }
        })
    }

    /// Are two cells in the grid linked?
    pub fn is_linked(&self, a: Coordinate, b: Coordinate) -> bool {
        if let (Some(a_index), Some(b_index)) = (self.graph_index(a), self.graph_index(b)) {
            self.graph.find_edge(a_index, b_index).is_some()
        } else {
            false
        }
    }

    pub fn is_neighbour_linked(&self, coord: Coordinate, direction: CompassPrimary) -> bool {
        self.neighbour_at_direction(coord, direction)
            .map_or(false, |neighbour_coord| self.is_linked(coord, neighbour_coord))
    }

    /// Is the coordinate within the grid's dimensions
    #[inline]
    pub fn is_valid_coordinate(&self, coord: Coordinate) -> bool {
        (coord.x as usize) < self.width.0 && (coord.y as usize) < self.height.0
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0..grid.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn coordinate_to_index(&self, coord: Coordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.y as usize * self.width.0 + coord.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn index_to_coordinate(&self, index: usize) -> Coordinate {
        coordinate_from_index(index, self.width)
    }

    pub fn contents(&self, coord: Coordinate) -> Option<CellContents> {
        self.coordinate_to_index(coord).map(|index| self.cells[index].contents)
    }

    pub fn set_contents(&mut self, coord: Coordinate, contents: CellContents) -> Result<()> {
        let index = self.coordinate_to_index(coord).ok_or(ErrorKind::InvalidCoordinate(coord))?;
        self.cells[index].contents = contents;
        Ok(())
    }

    /// Who occupies or has claimed the cell, if anyone. None for an invalid coordinate.
    pub fn occupant(&self, coord: Coordinate) -> Option<OccupantId> {
        self.coordinate_to_index(coord).and_then(|index| self.cells[index].occupant)
    }

    pub fn set_occupant(&mut self, coord: Coordinate, occupant: Option<OccupantId>) -> Result<()> {
        let index = self.coordinate_to_index(coord).ok_or(ErrorKind::InvalidCoordinate(coord))?;
        self.cells[index].occupant = occupant;
        Ok(())
    }

    #[inline]
    pub(crate) fn contents_at(&self, index: usize) -> CellContents {
        self.cells[index].contents
    }

    #[inline]
    pub fn iter(&self) -> CellIter {
        CellIter {
            width: self.width,
            current_cell_number: 0,
            cells_count: self.size(),
        }
    }

    pub fn iter_row(&self) -> RowIter {
        RowIter {
            width: self.width,
            current_row: 0,
            rows_count: self.height.0,
        }
    }

    pub fn iter_links(&self) -> LinksIter {
        LinksIter {
            graph_edge_iter: self.graph.raw_edges().iter(),
            width: self.width,
        }
    }

    fn is_neighbour(&self, a: Coordinate, b: Coordinate) -> bool {
        self.neighbours(a).iter().any(|&coord| coord == b)
    }

    /// Convert a grid coordinate into a petgraph node index.
    /// Returns None if the grid coordinate is invalid (out of the grid's dimensions).
    #[inline]
    fn graph_index(&self, coord: Coordinate) -> Option<NodeIndex<u32>> {
        self.coordinate_to_index(coord).map(NodeIndex::new)
    }
}

fn graph_size(width: Width, height: Height) -> (NodesCount, EdgesCount) {
    let cells_count = width.0 * height.0;
    // Every cell could link east and south, with some room for a few extra passages.
    let edges_count_hint = 2 * cells_count - cmp::min(cells_count, width.0 + height.0);
    (NodesCount(cells_count), EdgesCount(edges_count_hint))
}

fn coordinate_from_index(index: usize, width: Width) -> Coordinate {
    Coordinate::new((index % width.0) as u32, (index / width.0) as u32)
}

/// Row major iteration over every cell coordinate.
#[derive(Debug, Clone)]
pub struct CellIter {
    width: Width,
    current_cell_number: usize,
    cells_count: usize,
}

impl ExactSizeIterator for CellIter {} // default impl using size_hint()
impl Iterator for CellIter {
    type Item = Coordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let coord = coordinate_from_index(self.current_cell_number, self.width);
            self.current_cell_number += 1;
            Some(coord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower_bound = self.cells_count - self.current_cell_number;
        let upper_bound = lower_bound;
        (lower_bound, Some(upper_bound))
    }
}

/// Iteration over the grid one row of coordinates at a time, north to south.
#[derive(Debug, Clone)]
pub struct RowIter {
    width: Width,
    current_row: usize,
    rows_count: usize,
}

impl Iterator for RowIter {
    type Item = Vec<Coordinate>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row < self.rows_count {
            let y = self.current_row as u32;
            let row = (0..self.width.0).map(|x| Coordinate::new(x as u32, y)).collect();
            self.current_row += 1;
            Some(row)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rows_count - self.current_row;
        (remaining, Some(remaining))
    }
}

pub struct LinksIter<'a> {
    graph_edge_iter: slice::Iter<'a, graph::Edge<(), u32>>,
    width: Width,
}

impl<'a> Iterator for LinksIter<'a> {
    type Item = (Coordinate, Coordinate);

    fn next(&mut self) -> Option<Self::Item> {
        let width = self.width;
        self.graph_edge_iter.next().map(|edge| {
            (coordinate_from_index(edge.source().index(), width),
             coordinate_from_index(edge.target().index(), width))
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.graph_edge_iter.size_hint()
    }
}
impl<'a> ExactSizeIterator for LinksIter<'a> {} // default impl using size_hint()

impl<'a> fmt::Debug for LinksIter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LinksIter :: edges iter : {:?}", self.graph_edge_iter)
    }
}
