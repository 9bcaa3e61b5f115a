pub mod analyze;
pub mod health;
pub mod jobs;
pub mod results;
