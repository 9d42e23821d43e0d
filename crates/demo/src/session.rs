//! Scripted view interactions against one coordinator.

use std::time::Duration;

use roster_query::{Coordinator, CoordinatorState, Fetcher, FilterValue, QueryError};

/// One rendered line for the current coordinator state.
pub fn describe<F: Fetcher>(coordinator: &Coordinator<F>) -> String {
	let params = coordinator.params();
	match coordinator.state() {
		CoordinatorState::Idle => format!("idle [{params}]"),
		CoordinatorState::Loading { generation, previous, .. } => {
			let kept = previous.as_ref().map_or(0, |page| page.len());
			format!("loading {generation} [{params}] showing {kept} previous rows")
		}
		CoordinatorState::Success { generation, result, .. } => format!(
			"success {generation} [{params}] page {}/{} rows {} of {}",
			result.page_number.saturating_add(1),
			result.total_pages.max(1),
			result.len(),
			result.total_elements
		),
		CoordinatorState::Error { generation, error, .. } => format!("error {generation} [{params}] {error}"),
		CoordinatorState::Disposed => "disposed".to_owned(),
	}
}

/// Waits until the coordinator has neither a pending filter change nor a
/// request in flight, rendering every transition.
async fn settle<F: Fetcher>(coordinator: &mut Coordinator<F>, render: &mut impl FnMut(&Coordinator<F>)) {
	while coordinator.is_settling() || coordinator.state().is_loading() {
		if !coordinator.changed().await {
			break;
		}
		render(coordinator);
	}
}

/// Initial load, a typed name filter, a page click, a page size change and teardown.
pub async fn run<F: Fetcher>(
	coordinator: &mut Coordinator<F>,
	keystroke_gap: Duration,
	mut render: impl FnMut(&Coordinator<F>),
) -> Result<(), QueryError> {
	coordinator.refresh();
	render(coordinator);
	settle(coordinator, &mut render).await;

	for typed in ["R", "Ra", "Ram"] {
		coordinator.set_filters([("name", Some(FilterValue::from(typed)))])?;
		render(coordinator);
		tokio::time::sleep(keystroke_gap).await;
		coordinator.poll_events();
	}
	settle(coordinator, &mut render).await;

	coordinator.set_page(1)?;
	render(coordinator);
	settle(coordinator, &mut render).await;

	coordinator.set_page_size(5)?;
	render(coordinator);
	settle(coordinator, &mut render).await;

	coordinator.dispose();
	render(coordinator);
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use roster_query::{CoordinatorConfig, MemoryFetcher, QueryParams};

	use super::*;
	use crate::directory;

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn scripted_session_debounces_typing() {
		let fetcher = Arc::new(MemoryFetcher::new(directory::members(60)).with_latency(Duration::from_millis(40)));
		let config = CoordinatorConfig::new(QueryParams::new(20).with_filter("name", ""));
		let mut coordinator = Coordinator::new(fetcher, config).unwrap();
		let mut frames = Vec::new();

		run(&mut coordinator, Duration::from_millis(80), |c| frames.push(describe(c)))
			.await
			.unwrap();

		let loads = frames.iter().filter(|f| f.starts_with("loading")).count();
		assert_eq!(loads, 4, "{frames:#?}");
		assert!(frames.iter().any(|f| f.contains("name=\"Ram\"") && f.starts_with("success g1")));
		assert!(frames.iter().any(|f| f.starts_with("success g3") && f.contains("size=5")));
		assert_eq!(frames.last().map(String::as_str), Some("disposed"));
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn last_representable_page_renders() {
		let fetcher = Arc::new(MemoryFetcher::new(directory::members(10)));
		let mut coordinator = Coordinator::new(fetcher, CoordinatorConfig::default()).unwrap();

		coordinator.set_page(i64::from(u32::MAX)).unwrap();
		assert!(coordinator.changed().await);

		let frame = describe(&coordinator);
		assert!(frame.starts_with("success g0"), "{frame}");
		assert!(frame.contains(&format!("page {}/1 rows 0 of 10", u32::MAX)), "{frame}");
	}
}
