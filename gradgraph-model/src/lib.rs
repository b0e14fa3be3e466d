//! Dense feed-forward models trained on top of `gradgraph-core`.
//!
//! A [`Model`] owns a stack of dense layers and rebuilds a computation graph for every
//! training pass. Batches come from a [`DataSource`], progress can be reported through a
//! [`TrainingObserver`] such as the console [`Dashboard`], and trained parameters are
//! persisted with [`Model::save`] / [`Model::load`].

pub mod checkpoint;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod model;

pub use checkpoint::{read_checkpoint, write_checkpoint, CHECKPOINT_MAGIC};
pub use config::{DashboardConfig, LayerConfig, ModelConfig};
pub use dashboard::{layer_stats, Dashboard, LayerStats, TrainingObserver};
pub use data::{DataSource, InMemoryDataset};
pub use error::ModelError;
pub use model::{Model, ModelState};
