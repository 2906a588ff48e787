pub mod etl;
pub mod pipeline_sequence;
pub mod report;
pub mod stats;
pub mod table;
pub mod trip_id;
pub mod trip_time;
pub mod verify;

pub use crate::domain::model::{OutputFile, Table, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
