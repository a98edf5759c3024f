//! The reflection-driven transcoding engine.
//!
//! - [`xml`]: object → XML fragment
//! - [`json`]: XML fragment → JSON text
//! - [`object`]: XML fragment → object
//!
//! All three take their type information from the descriptors generated by
//! `#[derive(Reflect)]`. The forward path records every composite and enum
//! type it writes in a caller-supplied [`KnownTypes`](xmlops_support::KnownTypes);
//! the reverse path requires the nested types of its target to be recorded
//! there.

pub mod json;
pub mod object;
pub mod xml;

pub use json::{json_fragment_with, to_json_fragment};
pub use object::{to_object, to_object_list};
pub use xml::{to_xml_fragment, to_xml_list_fragment, to_xml_list_fragment_sparse};
