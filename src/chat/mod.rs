pub mod decoder;
pub mod endpoint;
pub mod error;
pub mod frame;
pub mod models;
pub mod prompts;
pub mod session;
pub mod stream;
pub use endpoint::*;
pub use error::*;
pub use models::*;
pub use session::*;
pub use stream::*;
