use criterion::{
    Criterion,
    criterion_group,
    criterion_main
};
use maze_chase::cells::{CellContents, Coordinate};
use maze_chase::generators::{self, GenerationConfigBuilder};
use maze_chase::maze::Maze;
use maze_chase::pathing::Pathfinder;
use maze_chase::units::{ExitsCount, Height, Width};

fn bench_maze(side: usize) -> Maze {
    let config = GenerationConfigBuilder::new(Width(side), Height(side))
        .wall_break_probability(0.2)
        .exits(ExitsCount(0))
        .build();
    generators::generate(&config, 350).unwrap()
}

fn bench_find_path(c: &mut Criterion) {
    c.bench_function("find_path_24", |b| {
        let maze = bench_maze(24);
        let mut pathfinder = Pathfinder::new();
        let (start, end) = (Coordinate::new(0, 0), Coordinate::new(23, 23));
        b.iter(|| pathfinder.find_path(maze.grid(), start, end))
    });
}

fn bench_find_path_no_path_mode(c: &mut Criterion) {
    c.bench_function("find_path_no_path_mode_24", |b| {
        let mut maze = bench_maze(24);
        let target = Coordinate::new(12, 12);
        for neighbour in maze.grid().links(target).unwrap().iter() {
            maze.grid_mut().set_contents(*neighbour, CellContents::Blocked).unwrap();
        }
        let mut pathfinder = Pathfinder::new();
        let start = Coordinate::new(0, 0);
        // Alternates between failing and tunnelling through the blocked ring.
        b.iter(|| pathfinder.find_path(maze.grid(), start, target))
    });
}

criterion_group!(benches,
    bench_find_path,
    bench_find_path_no_path_mode
);
criterion_main!(benches);
