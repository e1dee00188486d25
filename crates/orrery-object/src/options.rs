//! Runtime configuration

/// Options for bootstrapping a [`Runtime`](crate::Runtime)
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Name of the root metaclass
    pub root_class_name: String,

    /// Whether `create` accepts an empty class name
    pub allow_empty_class_names: bool,

    /// Maximum number of classes a super-chain walk may visit
    ///
    /// Values below 1 are treated as 1 by the runtime.
    pub max_hierarchy_depth: usize,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeOptions {
    /// Default options: any class name is accepted
    pub fn new() -> Self {
        Self {
            root_class_name: "Class".to_string(),
            allow_empty_class_names: true,
            max_hierarchy_depth: 1024,
        }
    }

    /// Options that reject empty class names
    pub fn strict() -> Self {
        Self {
            allow_empty_class_names: false,
            ..Self::new()
        }
    }

    /// Use a different name for the root metaclass
    pub fn with_root_class_name(mut self, name: impl Into<String>) -> Self {
        self.root_class_name = name.into();
        self
    }

    /// Limit super-chain walks to `depth` classes (at least 1)
    pub fn with_max_hierarchy_depth(mut self, depth: usize) -> Self {
        self.max_hierarchy_depth = depth.max(1);
        self
    }
}
