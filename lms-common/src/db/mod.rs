//! Host database access: connection setup, schema bootstrap, migrations

pub mod init;
pub mod migrations;

pub use init::*;
pub use migrations::*;
