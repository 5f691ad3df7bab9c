mod json_arg;
mod load_dotenv;
mod time;

pub use json_arg::read_json_arg;
pub use load_dotenv::load_dotenv;
pub use time::parse_time;

pub mod base_path;
