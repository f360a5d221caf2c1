pub mod api;

pub use api::{ router, serve, spawn, MockState };
