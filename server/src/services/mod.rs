pub mod aggregator;
pub mod gameinfo;
pub mod resolver;
