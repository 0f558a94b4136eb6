pub mod creation;
pub mod maintenance;
pub mod modification;
pub mod query;
pub mod seams;
pub mod transform;
