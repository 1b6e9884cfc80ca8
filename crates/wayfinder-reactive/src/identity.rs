//! Identity comparison used by [`Bus`](crate::Bus) to suppress redundant updates.
//!
//! Shared containers (`Rc`, `Arc`) compare by pointer, so publishing a freshly
//! built container always notifies even when its contents are equal. Plain
//! values such as strings and integers compare by value.

extern crate alloc;
use alloc::rc::Rc;
use alloc::sync::Arc;

/// Decides whether two values are "the same" for change detection.
///
/// This is deliberately not `PartialEq`: a `Bus<Rc<Params>>` must notify when a
/// new map is published, even if it holds the same entries as the old one.
pub trait Identity {
	/// Returns `true` if `other` is identical to `self`.
	fn is_identical(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Identity for Rc<T> {
	fn is_identical(&self, other: &Self) -> bool {
		Rc::ptr_eq(self, other)
	}
}

impl<T: ?Sized> Identity for Arc<T> {
	fn is_identical(&self, other: &Self) -> bool {
		Arc::ptr_eq(self, other)
	}
}

impl<T: Identity> Identity for Option<T> {
	fn is_identical(&self, other: &Self) -> bool {
		match (self, other) {
			(None, None) => true,
			(Some(a), Some(b)) => a.is_identical(b),
			_ => false,
		}
	}
}

impl Identity for String {
	fn is_identical(&self, other: &Self) -> bool {
		self == other
	}
}

impl Identity for &'static str {
	fn is_identical(&self, other: &Self) -> bool {
		self == other
	}
}

macro_rules! impl_identity_by_value {
	($($ty:ty),* $(,)?) => {
		$(
			impl Identity for $ty {
				fn is_identical(&self, other: &Self) -> bool {
					self == other
				}
			}
		)*
	};
}

impl_identity_by_value!(
	(),
	bool,
	char,
	u8,
	u16,
	u32,
	u64,
	usize,
	i8,
	i16,
	i32,
	i64,
	isize
);
