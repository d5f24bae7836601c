//! Syntax tree

mod declarations;
pub mod expr;
pub mod helpers;
pub mod identifiers;
pub mod literals;
pub mod singletons;
pub mod statement;
pub mod types;

pub use declarations::*;
pub use expr::Expr;
pub use identifiers::{Ident, Path};
pub use literals::Literal;
pub use statement::Statement;
pub use types::Type;
