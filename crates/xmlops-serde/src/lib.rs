//! # xmlops-serde
//!
//! Converts values between typed objects, XML fragments and JSON text.
//!
//! - **Transcoding** ([`transcode`]): walks the static descriptors generated
//!   by `#[derive(Reflect)]` to render an object as an XML element, to render
//!   an XML element as JSON text, and to rebuild an object from an XML
//!   element. The caller passes a [`KnownTypes`] registry to both directions.
//! - **Facade** ([`facade`]): whole-document serialization of any
//!   `serde` type through `quick_xml`, without descriptors.
//! - **Repository** ([`operator`]): typed add/query/update/delete over an
//!   [`xmlops_document::NodeEditor`].
//!
//! ## Example
//!
//! ```ignore
//! use xmlops_serde::{KnownTypes, Reflect, to_json_fragment, to_object, to_xml_fragment};
//!
//! #[derive(Debug, PartialEq, Reflect)]
//! struct User {
//!     id: i32,
//!     name: String,
//! }
//!
//! let mut known = KnownTypes::new();
//! let user = User { id: 1, name: "Ann".to_string() };
//!
//! let xml = to_xml_fragment(&user, &mut known)?;
//! assert_eq!(xml, r#"<User><Id>1</Id><Name>"Ann"</Name></User>"#);
//!
//! let json = to_json_fragment::<User>(&xml)?;
//! assert_eq!(json, r#""User":{"Id":1,"Name":"Ann"}"#);
//!
//! let back: User = to_object(&xml, &mut known)?;
//! assert_eq!(back, user);
//! ```

pub mod error;
pub mod facade;
pub mod json;
pub mod operator;
pub mod transcode;

pub use error::{Result, TranscodeError};
pub use facade::{
    FromXmlStream, deserialize_from_file, deserialize_from_reader, deserialize_from_str,
    serialize_to_file, serialize_to_string,
};
pub use operator::Repository;
pub use transcode::{
    json_fragment_with, to_json_fragment, to_object, to_object_list, to_xml_fragment,
    to_xml_list_fragment, to_xml_list_fragment_sparse,
};

pub use xmlops_support::{KnownTypes, Reconstruct, Reflect};
