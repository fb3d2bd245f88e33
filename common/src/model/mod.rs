pub mod point;
pub mod role;
pub mod signature;
pub mod typed;
