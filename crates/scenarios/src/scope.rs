/// Call-scoped mutable slot with a reset value.
///
/// Scenarios thread one of these through a single call instead of relying on
/// ambient thread-local storage. Whoever sets it clears it before returning.
#[derive(Debug, Clone)]
pub struct ScopedCell<T> {
	value: T,
	initial: fn() -> T,
}

impl<T> ScopedCell<T> {
	/// Creates a cell holding `initial()`.
	pub fn with_initial(initial: fn() -> T) -> Self {
		Self { value: initial(), initial }
	}

	/// Current value.
	pub fn get(&self) -> &T {
		&self.value
	}

	/// Replaces the current value.
	pub fn set(&mut self, value: T) {
		self.value = value;
	}

	/// Returns the current value and resets the cell.
	pub fn take(&mut self) -> T {
		std::mem::replace(&mut self.value, (self.initial)())
	}

	/// Resets the cell to its initial value.
	pub fn clear(&mut self) {
		self.value = (self.initial)();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn take_resets_to_initial() {
		let mut cell = ScopedCell::with_initial(|| "seed".to_string());
		cell.set("changed".to_string());
		assert_eq!(cell.take(), "changed");
		assert_eq!(cell.get(), "seed");
	}

	#[test]
	fn clear_discards_value() {
		let mut cell: ScopedCell<Option<String>> = ScopedCell::with_initial(|| None);
		cell.set(Some("hook".to_string()));
		cell.clear();
		assert_eq!(cell.get(), &None);
	}
}
