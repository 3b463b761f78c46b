//! Field tag parsing.
//!
//! A tag is a comma separated string: the first segment is the column name
//! (empty means "use the field identifier"), the rest are option flags.
//! `-` as the first segment skips the field.
//!
//! There is no escaping, so a column name containing `,` cannot be expressed.

use crate::value::FieldDescriptor;

const SKIP: &str = "-";
const OPT_SQUASH: &str = "squash";
const OPT_NULLABLE: &str = "nullable";

/// Parsed field tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive {
    /// Explicit column name; empty when the tag does not set one.
    pub name: String,
    pub skip: bool,
    pub nullable: bool,
    pub squash: bool,
}

impl Directive {
    /// Parse the tag `field` carries under `tag_key`.
    pub fn of(field: &FieldDescriptor, tag_key: &str) -> Self {
        parse_tag(field.tag(tag_key))
    }

    /// Column name for `field`: the explicit name, else the identifier.
    pub fn column_name<'a>(&'a self, field: &'a FieldDescriptor) -> &'a str {
        if self.name.is_empty() {
            field.ident
        } else {
            &self.name
        }
    }
}

/// Parse a raw tag string. Unknown flags are ignored.
pub fn parse_tag(tag: &str) -> Directive {
    let mut segments = tag.split(',');
    let first = segments.next().unwrap_or_default();

    let mut directive = Directive::default();
    if first == SKIP {
        directive.skip = true;
    } else {
        directive.name = first.to_string();
    }

    for opt in segments {
        match opt {
            OPT_SQUASH => directive.squash = true,
            OPT_NULLABLE => directive.nullable = true,
            _ => {}
        }
    }
    directive
}
