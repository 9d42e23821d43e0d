//! Synthetic member directory served by the demo.

use roster_query::{FilterValue, Filterable};

const FIRST: &[&str] = &["Ram", "Sita", "Ramesh", "Anita", "Kiran", "Rama", "Deepa", "Arjun", "Meera", "Vikram"];
const LAST: &[&str] = &["Shrestha", "Gurung", "Tamang", "Rai", "Thapa", "Karki"];
const REGIONS: &[&str] = &["north", "south", "east", "west"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
	pub id: u32,
	pub name: String,
	pub region: &'static str,
	pub contributor: bool,
}

impl Filterable for Member {
	fn matches(&self, key: &str, value: &FilterValue) -> bool {
		match key {
			"name" => value.matches_text(&self.name),
			"region" => value.matches_text(self.region),
			"contributor" => value.matches_text(if self.contributor { "yes" } else { "no" }),
			_ => false,
		}
	}
}

/// Deterministic directory of `count` members.
pub fn members(count: u32) -> Vec<Member> {
	(0..count)
		.map(|id| {
			let i = id as usize;
			Member {
				id,
				name: format!("{} {}", FIRST[i % FIRST.len()], LAST[(i / FIRST.len()) % LAST.len()]),
				region: REGIONS[(i * 7) % REGIONS.len()],
				contributor: id % 3 != 0,
			}
		})
		.collect()
}
