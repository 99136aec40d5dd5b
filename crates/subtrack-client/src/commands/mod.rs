pub(crate) mod common;
pub mod detect;
pub mod init_config;
pub mod sources;
pub mod suggest;
