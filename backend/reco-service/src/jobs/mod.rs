/// Background Jobs
pub mod refresh;
