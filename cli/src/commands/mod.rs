pub mod attribute;
pub mod profile;
