pub mod migrate;
pub mod pool;
pub mod rows;
pub mod seed;
