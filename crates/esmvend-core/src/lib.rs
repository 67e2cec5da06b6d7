pub mod config;
pub mod logging;

pub mod bundler;
pub mod checksum;
pub mod driver;
pub mod error;
pub mod fetch;
pub mod import_map;
pub mod module_table;
pub mod resolver;
pub mod storage;
pub mod url_model;
pub mod verify;
