pub mod clock;
pub mod config;
pub mod domain;
pub mod paths;
pub mod session;
pub mod speech;
pub mod srs;
pub mod store;
pub mod terminal;
