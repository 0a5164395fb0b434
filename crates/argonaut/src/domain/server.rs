//! Server descriptor for the upstream control plane session.

/// Connection descriptor for one control-plane session.
///
/// Immutable for the life of a session; replacing it bumps the switch
/// epoch so in-flight results from the previous server are discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerDescriptor {
    pub base_url: String,
    pub token: String,
    pub insecure: bool,
}

impl ServerDescriptor {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            insecure: false,
        }
    }

    /// Returns the host shown in the status bar; the token never leaves
    /// this struct.
    pub fn display_host(&self) -> &str {
        self.base_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
    }
}
