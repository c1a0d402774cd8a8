pub mod gemini;
pub mod request;
pub mod response;

pub use gemini::*;
pub use request::*;
pub use response::*;
