pub mod health;
pub mod non_weekend;
pub mod previous;
pub mod refresh;
pub mod shared;
