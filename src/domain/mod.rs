pub mod catalog;
pub mod changelog;
pub mod constraint;
pub mod document;
pub mod resolution;
pub mod source;
pub mod upload;
pub mod version;
