pub mod context;
pub mod conversion;
pub mod logging;
pub mod session;
pub mod settings;

// Always expose testing module (integration tests need it)
pub mod testing;
