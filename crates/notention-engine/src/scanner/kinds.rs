/// `#label` inline tag.
pub struct Tag;

impl Tag {
    pub const SIGIL: u8 = b'#';
}

/// `[key:value]` / `[key:is:value]` inline property.
pub struct Property;

impl Property {
    pub const OPEN: u8 = b'[';
    pub const CLOSE: u8 = b']';
    pub const SEP: u8 = b':';
    /// Marks the qualified form: the value segment starts with `is:`.
    pub const QUALIFIER: &'static str = "is:";
}
