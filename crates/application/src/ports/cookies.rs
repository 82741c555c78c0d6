//! Cookie read port

/// Port for reading cookie values by name.
///
/// Cookie storage belongs to the caller's environment; the dispatcher
/// only ever reads a single value when injecting the cross-site
/// request forgery header.
pub trait CookieSource: Send + Sync {
    /// Returns the value of the named cookie, if present.
    fn get(&self, name: &str) -> Option<String>;
}
