//! Lexer for the Lucite C99 front end.
//!
//! Pull-based: the parser asks for one token at a time via
//! [`Lexer::lex`]; there is no internal buffering beyond the token being
//! formed. The lexer assumes preprocessed input — no macro expansion or
//! `#include` resolution happens here.
//!
//! The [`NumericLiteral`] classifier is exposed separately: it is a
//! stateless re-analysis of a numeric token's spelling, used by the
//! semantic analyzer when the literal's type and value are needed.

mod cursor;
mod lexer;
mod numeric;
mod source_buffer;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use numeric::{NumericError, NumericLiteral};
pub use source_buffer::{SourceBuffer, SourceError};
