pub mod kvpath;
mod store;

pub use store::Store;
