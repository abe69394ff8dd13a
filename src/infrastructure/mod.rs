pub mod crmm;
pub mod document;
pub mod files;
pub mod github;
pub mod http;
