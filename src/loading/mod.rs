//! Loading Module
//!
//! Observable loading/error/data state around a single async operation.

mod loader;

pub use loader::{LoadStatus, Loader, LoaderConfig, LoadingState};
