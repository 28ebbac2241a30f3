use super::annotation::Annotations;
use super::synthon::Mark;

/// An opaque payload flowing through the assembly engine.
///
/// Items are immutable in identity once created. The only mutation allowed is appending to
/// the annotation bag, which is why annotations are reachable through a shared reference.
pub trait Item: Send + Sync + Sized + 'static {
    /// Canonical identity key. Two items with the same key are the same compound.
    fn key(&self) -> &str;

    /// Whether the producing collaborator managed to build a usable item.
    fn is_valid(&self) -> bool;

    fn annotations(&self) -> &Annotations<Self>;
}

/// An item carrying compatibility marks, used to build mark-indexed pools.
pub trait Marked: Item {
    /// The reactive capabilities this item exhibits.
    fn marks(&self) -> &[Mark];

    /// The marks this item can pair with when looking up partners.
    fn compatible_marks(&self) -> &[Mark];
}
