use crate::descriptor::to_snake_case;
use std::fmt;

/// The closed set of supported type casts (`api:"as:<cast>"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCast {
    Datetime,
    Duration,
    Schema,
}

impl TypeCast {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "datetime" => Some(TypeCast::Datetime),
            "duration" => Some(TypeCast::Duration),
            "schema" => Some(TypeCast::Schema),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCast::Datetime => "datetime",
            TypeCast::Duration => "duration",
            TypeCast::Schema => "schema",
        }
    }
}

impl fmt::Display for TypeCast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tag parse failure. Surfaced by the schema generator or the operation
/// registry as a declaration error, never at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// The tag text does not scan as `namespace:"value"` entries.
    Malformed { tag: String },
    /// An unknown key inside the framework (`api`) namespace.
    UnknownKey { key: String },
    /// `as:<cast>` names a cast outside the supported set.
    UnknownCast { cast: String },
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagError::Malformed { tag } => write!(f, "malformed tag: {tag:?}"),
            TagError::UnknownKey { key } => {
                write!(f, "unknown key {key:?} in api tag namespace")
            }
            TagError::UnknownCast { cast } => {
                write!(f, "unsupported type cast {cast:?}")
            }
        }
    }
}

impl std::error::Error for TagError {}

/// Parsed per-field metadata. One instance per field per generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTag {
    /// Serialization-name override from the `json` namespace.
    pub name: Option<String>,
    pub omit_empty: Option<bool>,
    pub read_only: Option<bool>,
    pub write_only: Option<bool>,
    pub nullable: Option<bool>,
    pub ignored: Option<bool>,
    pub deprecated: Option<bool>,
    pub required: Option<bool>,
    pub type_cast: Option<TypeCast>,
    pub explode: Option<bool>,
    pub description: Option<String>,
    pub example: Option<String>,
    pub style: Option<String>,
    /// Header-name override (`name:"X-Request-Id"`).
    pub header_name: Option<String>,
    /// Media-type override for body/response sections.
    pub content_type: Option<String>,
}

impl FieldTag {
    pub fn is_ignored(&self) -> bool {
        self.ignored == Some(true)
    }

    pub fn is_required(&self) -> bool {
        self.required == Some(true)
    }

    /// Wire name for a field: explicit `json` override, else the snake-cased
    /// declared name.
    pub fn effective_name(&self, field_name: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => to_snake_case(field_name),
        }
    }
}

/// Parse one field's raw tag text.
///
/// The empty string yields an all-absent [`FieldTag`]. See the module docs
/// for the recognized vocabulary.
pub fn parse_field_tag(raw: &str) -> Result<FieldTag, TagError> {
    let mut tag = FieldTag::default();

    for (key, value) in scan_entries(raw)? {
        match key {
            "json" => {
                for part in value.split(',') {
                    match part {
                        "" => {}
                        "-" => tag.ignored = Some(true),
                        "omitempty" => tag.omit_empty = Some(true),
                        name => tag.name = Some(name.to_string()),
                    }
                }
            }
            "api" => {
                for part in value.split(',') {
                    match part {
                        // comment-only annotation, tolerated
                        "" => {}
                        "ignore" => tag.ignored = Some(true),
                        "readonly" => tag.read_only = Some(true),
                        "writeonly" => tag.write_only = Some(true),
                        "nullable" => tag.nullable = Some(true),
                        "deprecated" => tag.deprecated = Some(true),
                        "required" => tag.required = Some(true),
                        other => {
                            if let Some(cast) = other.strip_prefix("as:") {
                                tag.type_cast = Some(TypeCast::parse(cast).ok_or_else(|| {
                                    TagError::UnknownCast {
                                        cast: cast.to_string(),
                                    }
                                })?);
                            } else {
                                return Err(TagError::UnknownKey {
                                    key: other.to_string(),
                                });
                            }
                        }
                    }
                }
            }
            "description" => tag.description = Some(value.to_string()),
            "example" => tag.example = Some(value.to_string()),
            "style" => tag.style = Some(value.to_string()),
            "explode" => match value {
                "true" => tag.explode = Some(true),
                "false" => tag.explode = Some(false),
                _ => {
                    return Err(TagError::Malformed {
                        tag: raw.to_string(),
                    })
                }
            },
            "name" => tag.header_name = Some(value.to_string()),
            "content-type" => tag.content_type = Some(value.to_string()),
            // foreign tooling namespace, skipped
            _ => {}
        }
    }

    Ok(tag)
}

/// Scan `key:"value"` entries out of the raw text.
fn scan_entries(raw: &str) -> Result<Vec<(&str, &str)>, TagError> {
    let mut entries = Vec::new();
    let mut rest = raw.trim_start();

    while !rest.is_empty() {
        let colon = rest.find(':').ok_or_else(|| malformed(raw))?;
        let key = &rest[..colon];
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(malformed(raw));
        }

        let after_colon = &rest[colon + 1..];
        if !after_colon.starts_with('"') {
            return Err(malformed(raw));
        }
        let close = after_colon[1..].find('"').ok_or_else(|| malformed(raw))?;
        let value = &after_colon[1..1 + close];

        entries.push((key, value));
        rest = after_colon[1 + close + 1..].trim_start();
    }

    Ok(entries)
}

fn malformed(raw: &str) -> TagError {
    TagError::Malformed {
        tag: raw.to_string(),
    }
}
