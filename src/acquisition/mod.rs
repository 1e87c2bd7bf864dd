//! Acquisition core - lifecycle control, pollers, queue consumer, store

mod collector;
mod engine;
mod lifecycle;
mod poller;
mod sinks;
mod store;

pub use collector::Collector;
pub use engine::{AcquisitionEngine, EngineError, ReaderFactory, StartOutcome};
pub use lifecycle::{LifecycleController, LifecycleState, RunToken};
pub use poller::PollerPool;
pub use sinks::{ChartSink, DisplaySink, LogChart, LogDisplay};
pub use store::ReadingStore;
