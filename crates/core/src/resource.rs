//! Resource trait: a backend record with a stable identity.

/// A record mirrored from the backend that client-side stores can cache,
/// replace and remove by id.
pub trait Resource: Clone + Send + Sync + core::fmt::Debug + 'static {
    /// Strongly-typed identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display + Send + Sync;

    /// Returns the record identifier.
    fn id(&self) -> &Self::Id;

    /// Human label used in notifications ("Tariff CAS → RAB").
    fn label(&self) -> String {
        self.id().to_string()
    }
}
