/// One page of list results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage<T> {
	pub items: Vec<T>,
	/// Zero-based page index this result claims to hold.
	pub page_number: u32,
	pub total_pages: u32,
	pub total_elements: u64,
}

impl<T> ResultPage<T> {
	pub fn new(items: Vec<T>, page_number: u32, total_pages: u32, total_elements: u64) -> Self {
		Self {
			items,
			page_number,
			total_pages,
			total_elements,
		}
	}

	/// Slices page `page` of size `page_size` out of a complete result set.
	///
	/// Pages past the end are empty but keep the requested `page_number`.
	pub fn paginate(all: Vec<T>, page: u32, page_size: u32) -> Self {
		let total = all.len();
		let size = page_size.max(1) as usize;
		let total_pages = total.div_ceil(size) as u32;
		let items = all.into_iter().skip(page as usize * size).take(size).collect();
		Self::new(items, page, total_pages, total as u64)
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}
