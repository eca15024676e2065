use std::fmt;

const MASK: &str = "****";

/// Wraps a credential so it cannot leak through `Debug` or `Display` output. The wrapped value
/// only comes out through an explicit [`reveal`](Secret::reveal).
#[derive(Clone, Default)]
pub struct Secret<T: Clone + Default> {
    inner: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn reveal(&self) -> &T {
        &self.inner
    }
}

impl<T: Clone + Default> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl<T: Clone + Default> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}
