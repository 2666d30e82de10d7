//! Writer configuration.

/// Options for a single write.
///
/// The reader needs no options: it accepts streams written with any of
/// them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriterOptions {
    /// Put names used more than once into the preamble table. When off,
    /// every name is written inline and the table is empty.
    pub intern_names: bool,
    /// Bytes to reserve for the output buffer up front.
    pub initial_capacity: usize,
}

impl WriterOptions {
    pub const DEFAULT_CAPACITY: usize = 256;

    #[must_use]
    pub fn with_intern_names(mut self, intern_names: bool) -> Self {
        self.intern_names = intern_names;
        self
    }

    #[must_use]
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            intern_names: true,
            initial_capacity: Self::DEFAULT_CAPACITY,
        }
    }
}
