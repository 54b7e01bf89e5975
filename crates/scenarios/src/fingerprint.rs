/// 31-polynomial hash over UTF-16 code units, wrapping in `i32`.
///
/// The empty string hashes to 0; other inputs reach 0 only by collision.
pub fn fingerprint(text: &str) -> i32 {
	text.encode_utf16().fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::fingerprint;

	#[rstest]
	#[case("", 0)]
	#[case("a", 97)]
	#[case("shared", -903_566_235)]
	#[case("resurrected", 440_761_088)]
	fn known_values(#[case] text: &str, #[case] expected: i32) {
		assert_eq!(fingerprint(text), expected);
	}
}
