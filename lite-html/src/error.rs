use thiserror::Error;

/// Everything that can go wrong while turning a literal into a live region.
///
/// Tokenizer and preparation failures are cached with the literal, so the
/// same error comes back every time the literal is used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("a value cannot be bound in the tag name of <{tag}>")]
    TagNameBinding { tag: String },

    #[error("a value cannot be bound in attribute name position on <{tag}>")]
    AttributeNameBinding { tag: String },

    #[error("attribute `{name}` is bound more than once on <{tag}>")]
    DuplicateAttribute { tag: String, name: String },

    #[error(
        "<{tag}> has bound attributes and a quoted attribute value containing '>'; \
         write it as &gt;"
    )]
    AmbiguousTagEnd { tag: String },

    #[error("binding {index} has no marker in the parsed template")]
    MissingMarker { index: usize },

    #[error("template has {expected} value slots but {actual} values were given")]
    ValueCount { expected: usize, actual: usize },

    #[error("part is not attached to a live document")]
    Detached,
}
