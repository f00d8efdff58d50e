//! Identification: which declaration every name refers to.
//!
//! - [`Attribute`] - what is known about one declaration
//! - [`IdentificationTable`] - scoped name → attribute mapping

mod attribute;
mod table;

pub use attribute::{Attribute, AttributeData, AttributeKind};
pub use table::IdentificationTable;
