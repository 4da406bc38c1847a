use uuid::Uuid;

/// Entities with a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// A short presentation label for listings and logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}
