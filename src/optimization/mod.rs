pub mod config;
pub mod data;
pub mod error;
pub mod id;
pub mod io;
pub mod logging;
pub mod network;
pub mod network_design;
pub mod routing;
pub mod runner;
pub mod schedule;
pub mod signals;
