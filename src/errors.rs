//! Crate errors. Other modules `use crate::errors::*;` to get the `Error`, `ErrorKind`,
//! `Result` and `ResultExt` types that `error_chain!` creates.

use error_chain::error_chain;

use crate::cells::Coordinate;

error_chain! {
    errors {
        InvalidDimensions(width: usize, height: usize) {
            description("invalid grid dimensions")
            display("grid dimensions must be positive, got {}x{}", width, height)
        }
        InvalidProbability(p: f64) {
            description("invalid wall break probability")
            display("wall break probability must be within [0, 1], got {}", p)
        }
        TooManyExits(requested: usize, available: usize) {
            description("too many exits for the grid")
            display("requested {} exits but only {} cells are free to hold one", requested, available)
        }
        InvalidCoordinate(coord: Coordinate) {
            description("coordinate outside of the grid")
            display("coordinate ({}, {}) is outside of the grid", coord.x, coord.y)
        }
        NotNeighbours(a: Coordinate, b: Coordinate) {
            description("cells are not grid neighbours")
            display("cannot link ({}, {}) to ({}, {}): not grid neighbours", a.x, a.y, b.x, b.y)
        }
    }
}
