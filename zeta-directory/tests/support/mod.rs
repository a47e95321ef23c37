pub mod directory;
pub mod http;
