pub mod assessment;
pub mod competency;
pub mod employee;
pub mod position;
pub mod store;
