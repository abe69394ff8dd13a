pub mod app;
pub mod publish;
pub mod versions;
