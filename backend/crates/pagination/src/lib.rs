//! Page, size and sort composition for the record services' list endpoints.
//!
//! List handlers receive loosely typed `page`, `size` and `sort` query
//! parameters. This crate turns them into a bounded [`PageRequest`] whose
//! ordering is total: every sort falls back to the identity field ascending,
//! so consecutive pages never overlap or skip rows.
//!
//! ```
//! use pagination::{PageLimits, PageRequest, SortKey};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Field {
//!     Id,
//!     Name,
//! }
//!
//! impl SortKey for Field {
//!     const IDENTITY: Self = Self::Id;
//!
//!     fn parse(field: &str) -> Option<Self> {
//!         match field {
//!             "id" => Some(Self::Id),
//!             "name" => Some(Self::Name),
//!             _ => None,
//!         }
//!     }
//!
//!     fn as_str(self) -> &'static str {
//!         match self {
//!             Self::Id => "id",
//!             Self::Name => "name",
//!         }
//!     }
//! }
//!
//! let request =
//!     PageRequest::<Field>::compose(Some(2), Some(500), Some("name,desc"), PageLimits::default())
//!         .expect("valid request");
//! assert_eq!(request.size(), 100);
//! assert_eq!(request.sort().describe(), "name,desc");
//! ```

mod error;
mod page;
mod request;
mod sort;

pub use error::PaginationError;
pub use page::Page;
pub use request::{PageLimits, PageRequest, filter_value};
pub use sort::{Direction, Sort, SortKey};
