mod depth;
mod resolve;

pub use depth::DepthContext;
pub use resolve::resolve;
