//! Identity registry: one shared resource reachable through direct, weak and
//! cloned handles, cross-checked by value and by identity.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use mirage_entropy::Nondeterminism;
use rustc_hash::FxHashMap;

use crate::error::{Result, ScenarioError};
use crate::fingerprint::fingerprint;

/// Pool holding the owning handle.
pub const POOL_DIRECT: &str = "direct";
/// Pool holding a weak viewer of the owner.
pub const POOL_WRAPPED: &str = "wrapped";
/// Pool holding a value-equal clone.
pub const POOL_MIRRORED: &str = "mirrored";

const OWNER_KEY: &str = "critical";
const SHARED_NAME: &str = "shared";
const SHADOW_NAME: &str = "shadow";
const RESURRECTED_NAME: &str = "resurrected";

/// Trace line when the first value-equal entry is the candidate itself.
pub const OUTCOME_SHARED: &str = "Alias resolved to shared instance";
/// Trace line when no value-equal entry exists.
pub const OUTCOME_MISSING: &str = "Analyzer might believe alias missing, but runtime sees new instance.";
/// Trace line when a value-equal but distinct entry comes first.
pub const OUTCOME_DISTINCT: &str = "Indistinguishable but distinct object present";

/// Named resource whose equality is by name, not identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
	name: String,
}

impl Resource {
	/// Creates a resource.
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}

	/// Logical name, also the equality key.
	pub fn name(&self) -> &str {
		&self.name
	}
}

impl fmt::Display for Resource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "CriticalResource:{}", self.name)
	}
}

/// How a handle relates to the resource it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
	/// Holds the owning reference.
	Direct,
	/// Looks the owner up by key; resurrects when the owner is gone.
	Weak,
	/// Holds an equal copy with its own identity.
	Cloned,
}

/// Reference to a resource with an ownership tag.
#[derive(Debug, Clone)]
pub enum Handle {
	/// Owning reference.
	Direct(Arc<Resource>),
	/// Viewer keyed into the owner table.
	Weak {
		/// Owner table key.
		owner: String,
	},
	/// Independent copy.
	Cloned(Arc<Resource>),
}

impl Handle {
	/// Ownership tag of this handle.
	pub const fn ownership(&self) -> Ownership {
		match self {
			Self::Direct(_) => Ownership::Direct,
			Self::Weak { .. } => Ownership::Weak,
			Self::Cloned(_) => Ownership::Cloned,
		}
	}
}

/// Read-only pools of handles over a shared owner table.
#[derive(Debug)]
pub struct IdentityRegistry {
	source: Arc<dyn Nondeterminism>,
	owners: FxHashMap<String, Arc<Resource>>,
	pools: FxHashMap<&'static str, Box<[Handle]>>,
}

impl IdentityRegistry {
	/// Builds the three pools around one live shared resource.
	pub fn new(source: Arc<dyn Nondeterminism>) -> Self {
		Self::build(source, true)
	}

	/// Builds the pools with the owner already unreachable, so weak handles
	/// resurrect.
	pub fn with_released_owner(source: Arc<dyn Nondeterminism>) -> Self {
		Self::build(source, false)
	}

	fn build(source: Arc<dyn Nondeterminism>, owner_live: bool) -> Self {
		let critical = Arc::new(Resource::new(SHARED_NAME));
		let mut owners = FxHashMap::default();
		if owner_live {
			owners.insert(OWNER_KEY.to_string(), Arc::clone(&critical));
		}

		let mut pools: FxHashMap<&'static str, Box<[Handle]>> = FxHashMap::default();
		pools.insert(POOL_WRAPPED, Box::new([Handle::Weak { owner: OWNER_KEY.to_string() }]));
		pools.insert(POOL_MIRRORED, Box::new([Handle::Cloned(Arc::new(Resource::clone(&critical)))]));
		pools.insert(POOL_DIRECT, Box::new([Handle::Direct(critical)]));

		Self { source, owners, pools }
	}

	/// Handles of one pool.
	pub fn pool(&self, name: &str) -> Option<&[Handle]> {
		self.pools.get(name).map(|handles| &**handles)
	}

	/// Resolves a handle to the resource it currently denotes.
	pub fn resolve(&self, handle: &Handle) -> Arc<Resource> {
		match handle {
			Handle::Direct(resource) | Handle::Cloned(resource) => Arc::clone(resource),
			Handle::Weak { owner } => self
				.owners
				.get(owner)
				.cloned()
				.unwrap_or_else(|| Arc::new(Resource::new(RESURRECTED_NAME))),
		}
	}

	fn first_of(&self, pool: &str) -> Result<&Handle> {
		self.pools
			.get(pool)
			.and_then(|handles| handles.first())
			.ok_or_else(|| ScenarioError::invariant(format!("identity pool '{pool}' is missing or empty")))
	}

	/// Runs the scenario.
	pub fn run(&self) -> Result<Vec<String>> {
		let pool = select_pool(self.source.nanos());
		let handle = self.first_of(pool)?;
		let candidate = self.resolve(handle);
		tracing::debug!(pool, ownership = ?handle.ownership(), candidate = %candidate, "scenario.identity.resolve");

		let mut messages = vec![format!("Aliasing candidate hash: {}", fingerprint(candidate.name()))];

		let mut queue = VecDeque::with_capacity(3);
		queue.push_back(Arc::new(Resource::new(SHADOW_NAME)));
		queue.push_back(self.resolve(self.first_of(POOL_DIRECT)?));
		queue.push_back(Arc::new(Resource::new(SHARED_NAME)));

		let rendered = candidate.to_string();
		let maybe_same = queue.iter().find(|entry| entry.to_string() == rendered);
		let outcome = match maybe_same {
			Some(entry) if Arc::ptr_eq(entry, &candidate) => OUTCOME_SHARED,
			None => OUTCOME_MISSING,
			Some(_) => OUTCOME_DISTINCT,
		};
		messages.push(outcome.to_string());
		Ok(messages)
	}
}

fn select_pool(seed: u64) -> &'static str {
	if seed % 2 == 0 {
		return POOL_DIRECT;
	}
	if seed % 3 == 0 {
		return POOL_WRAPPED;
	}
	POOL_MIRRORED
}
