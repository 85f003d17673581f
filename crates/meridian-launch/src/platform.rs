/// Host operating system, as far as launch conventions are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostPlatform {
    MacOs,
    Linux,
    Windows,
}

impl HostPlatform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            HostPlatform::MacOs
        } else if cfg!(windows) {
            HostPlatform::Windows
        } else {
            // Other Unix-likes launch the same way Linux does.
            HostPlatform::Linux
        }
    }

    /// Whether `.app` bundles are launched through the bundle helper.
    pub fn launches_bundles(self) -> bool {
        matches!(self, HostPlatform::MacOs)
    }
}
