//! Content payloads carried through a pipe
//!
//! The router never looks inside content. It only needs to clone it for
//! fan-out, compare it for change detection, and ask whether it is blank
//! so an outlet can fall back to its default.

use std::sync::Arc;

use bytes::Bytes;

/// A render payload that can be published through a pipe
///
/// Clones should be cheap: every observer of a channel receives the same
/// value by reference, but outlets keep their own copy. `Bytes` and
/// `Arc<T>` are reference counted and never copy their data.
pub trait Content: Clone + PartialEq + Send + Sync + 'static {
    /// Whether this value renders as nothing
    ///
    /// Outlets display their default content instead of a blank value.
    fn is_blank(&self) -> bool {
        false
    }
}

impl Content for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Content for &'static str {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Content for Vec<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Content for Bytes {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Content for Arc<T> where T: ?Sized + PartialEq + Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(String::new().is_blank());
        assert!("".is_blank());
        assert!(Vec::<String>::new().is_blank());
        assert!(Bytes::new().is_blank());
    }

    #[test]
    fn test_non_blank_values() {
        assert!(!"Aloha!".to_string().is_blank());
        assert!(!vec!["How are you?"].is_blank());
        assert!(!Bytes::from_static(b"<p>hi</p>").is_blank());
        assert!(!Arc::new(0u8).is_blank());
    }

    #[test]
    fn test_bytes_clone_shares_memory() {
        let content = Bytes::from(vec![1u8; 1024]);
        let copy = content.clone();

        assert_eq!(content.as_ptr(), copy.as_ptr());
        assert_eq!(content, copy);
    }
}
