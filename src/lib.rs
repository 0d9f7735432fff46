//! Reader for INI-style text made of `[section]` headers and `key=value`
//! lines.
//!
//! ```
//! let doc = inilex::parse("[foo]\nfoo=FOO\n").unwrap();
//! assert_eq!(doc.lookup("foo", "foo"), Some("FOO"));
//! ```

mod ini;

pub use self::ini::*;
