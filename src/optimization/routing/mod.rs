pub mod dijkstra;
pub mod router;

pub use router::{emergency_route, find_path, shortest_route, RouteResult, RouteStep};
