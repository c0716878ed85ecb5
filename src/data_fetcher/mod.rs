pub mod api;
pub mod models;
pub mod processors;

pub use api::{ShutdownFlag, StructureBuilder};
pub use models::{League, Structure, Team};
pub use processors::aggregate_matches;
