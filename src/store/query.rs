// Filter evaluation shared by the store backends

use crate::catalog::{Release, ReleaseFilter, SortField, SortOrder};
use crate::version::Version;
use std::cmp::Ordering;

/// Select, sort and paginate `releases` according to a normalized filter.
/// Returns the page and the number of matches before pagination.
pub fn apply<'a>(
    releases: impl IntoIterator<Item = &'a Release>,
    filter: &ReleaseFilter,
) -> (Vec<Release>, usize) {
    let mut matched: Vec<&Release> = releases
        .into_iter()
        .filter(|r| filter.matches(r))
        .collect();
    let total = matched.len();

    let field = filter.sort_field();
    let order = filter.order();
    matched.sort_by(|a, b| compare(a, b, field, order));

    let offset = usize::try_from(filter.offset).unwrap_or(0);
    let limit = usize::try_from(filter.limit).unwrap_or(usize::MAX);
    let page = matched
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();
    (page, total)
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

fn compare(a: &Release, b: &Release, field: SortField, order: SortOrder) -> Ordering {
    match field {
        SortField::Version => compare_versions(&a.version, &b.version, order),
        SortField::ReleaseDate => directed(a.release_date.cmp(&b.release_date), order),
        SortField::Platform => directed(a.platform.as_str().cmp(b.platform.as_str()), order),
        SortField::Architecture => {
            directed(a.architecture.as_str().cmp(b.architecture.as_str()), order)
        }
        SortField::CreatedAt => directed(a.created_at.cmp(&b.created_at), order),
    }
}

/// Unparseable versions sort after every valid one regardless of direction
fn compare_versions(a: &str, b: &str, order: SortOrder) -> Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (Ok(a), Ok(b)) => directed(a.cmp(&b), order),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => directed(a.cmp(b), order),
    }
}
