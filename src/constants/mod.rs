pub mod categories;
pub mod defaults;
pub mod envvars;
pub mod keys;
