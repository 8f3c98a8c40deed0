//! Types shared by every layer of the query engine: tagged values, result sets and the
//! portable status taxonomy.

pub mod error_code;
pub mod result_set;
pub mod value;

pub use error_code::ErrorCode;
pub use result_set::ResultSet;
pub use value::{Kind, Value};
