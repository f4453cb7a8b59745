//! Test doubles shared across frontdesk crates.

pub mod generator;
pub mod store;

pub use generator::{
    FailingGenerator, FixedGenerator, GeneratorCall, RecordingGenerator, SlowGenerator,
};
pub use store::FailingKvStore;
