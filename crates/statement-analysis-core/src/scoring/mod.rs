pub mod composite;

pub use composite::{score_composites, CompositeScores};
