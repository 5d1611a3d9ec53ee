pub mod ask;
pub mod ingest;
pub mod init;
pub mod serve;
pub mod status;
