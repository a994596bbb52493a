pub mod astar;
pub mod common;
pub mod config;
pub mod map;
pub mod notify;
pub mod scenario;
pub mod stat;

pub use astar::{a_star_search, find_path, PathFinder};
pub use common::{Cell, InvalidInput, Path, SearchError};
pub use notify::{Notifier, TracingNotifier};
