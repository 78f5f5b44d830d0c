mod client;
mod weather_repository;

pub use client::*;
pub use weather_repository::*;
