/// Settings of a [Dependencies](crate::Dependencies) container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSettings {
    /// How many keys a single resolution chain may contain
    pub max_resolution_depth: usize,
    /// Panic after logging a cyclic dependency instead of returning the error
    ///
    /// Meant for debug builds, where a cycle should fail loudly.
    pub panic_on_cycle: bool,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            max_resolution_depth: 64,
            panic_on_cycle: false,
        }
    }
}

impl ContainerSettings {
    pub fn max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    pub fn panic_on_cycle(mut self, panic: bool) -> Self {
        self.panic_on_cycle = panic;
        self
    }
}
