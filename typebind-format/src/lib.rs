#![warn(missing_docs)]
#![forbid(unsafe_code)]
//! Token-stream abstractions for typebind.
//!
//! Adapters never see bytes: they pull [`TokenKind`]s from a [`TokenReader`]
//! and push values into a [`TokenWriter`]. Concrete wire formats (JSON in
//! `typebind-json`, the in-memory tree in `typebind`) implement both traits.

mod error;
pub use error::{StreamError, SyntaxError};

mod path;
pub use path::{JsonPath, PathStep};

mod token;
pub use token::TokenKind;

mod reader;
pub use reader::TokenReader;

mod writer;
pub use writer::{TokenWriter, is_json_number};
