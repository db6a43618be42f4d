pub mod content_type;
pub mod error;
pub mod fields;
pub mod limits;
pub mod request;
pub mod status;

pub use error::{DecodeError, DecodeResult};
pub use fields::{FieldMap, FieldValue};
pub use request::{Action, Method, Provider, RequestDescriptor, RequestMode, Target};
pub use status::StatusCode;
