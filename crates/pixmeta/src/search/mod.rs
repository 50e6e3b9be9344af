//! Search over the file list: `key:value` term parsing, free-text and
//! structured filtering, sorting, suggestions and recent-search history.

pub mod engine;
pub mod filter;
pub mod query;
pub mod recent;
pub mod sort;
pub mod suggest;

pub use engine::{filter_files, FacetValues, SearchCriteria, SearchEngine};
pub use filter::{parse_size_mb, DateRange, FilterOptions, SizeRange};
pub use query::ParsedQuery;
pub use recent::{RecentSearches, MAX_RECENT_SEARCHES};
pub use sort::{SortDirection, SortField, SortOptions};
pub use suggest::{suggestions, Suggestion, SuggestionKind, MAX_SUGGESTIONS};
