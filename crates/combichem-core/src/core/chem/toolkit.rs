/// Structure-level operations supplied by an external cheminformatics backend.
///
/// Implementations must be pure functions of their input so that the engine can call them
/// from worker threads in any order.
pub trait StructureToolkit: Send + Sync {
    /// Parses and re-renders `repr` canonically. `None` means the input is not a valid
    /// structure.
    fn canonicalize(&self, repr: &str) -> Option<String>;

    /// Joins the `.`-separated parts of `joined` on matching attachment-point labels.
    /// `None` means the fusion failed.
    fn fuse_on_attachment_mapping(&self, joined: &str) -> Option<String>;
}
