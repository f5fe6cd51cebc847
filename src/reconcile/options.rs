/// Options for reconciling a table with its model.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Compute and return the statements without executing them
    pub dry_run: bool,
    /// Allow operations that drop columns, keys or constraints
    pub allow_destructive: bool,
}

impl ReconcileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Allow or refuse destructive operations.
    pub fn with_allow_destructive(mut self, allow: bool) -> Self {
        self.allow_destructive = allow;
        self
    }
}
