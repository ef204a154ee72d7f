pub mod errors;
pub mod types;

pub use errors::{Error, Result, ResultExt};
pub use types::{
    slugify, CriterionScore, Function, Industry, ScoreScale, Subfunction, Task, TaskDimension,
};
