mod errors;
mod traits;
mod types;

pub use errors::EnvError;
pub use traits::Env;
pub use types::{Space, Step};
