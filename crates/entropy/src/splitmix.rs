const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
const MIX_CONST1: u64 = 0xBF58_476D_1CE4_E5B9;
const MIX_CONST2: u64 = 0x94D0_49BB_1331_11EB;

/// SplitMix64 stream generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMix64 {
	state: u64,
}

impl SplitMix64 {
	/// Creates a generator starting from `seed`.
	pub const fn new(seed: u64) -> Self {
		Self { state: seed }
	}

	/// Returns the next 64-bit output.
	pub fn next_u64(&mut self) -> u64 {
		self.state = self.state.wrapping_add(GOLDEN_GAMMA);
		let mut z = self.state;
		z = (z ^ (z >> 30)).wrapping_mul(MIX_CONST1);
		z = (z ^ (z >> 27)).wrapping_mul(MIX_CONST2);
		z ^ (z >> 31)
	}

	/// Returns a uniform draw in `[0, 1)` built from the top 53 bits.
	pub fn next_unit(&mut self) -> f64 {
		(self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
	}

	/// Returns a fair coin flip.
	pub fn next_bool(&mut self) -> bool {
		self.next_u64() >> 63 == 1
	}
}
