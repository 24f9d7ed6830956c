pub mod flows;
pub mod interactive;
pub mod log;
pub mod presence;
pub mod reward;
pub mod session;
pub mod simulate;
pub mod store;
pub mod timer;
pub mod wallet;
