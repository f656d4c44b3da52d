pub mod error;
pub mod genesis;
pub mod params;
pub mod script;
pub mod types;
