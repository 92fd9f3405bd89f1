pub mod bounds;
pub mod solve;
