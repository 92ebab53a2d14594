use campus_events_api_types::{Event, UnknownVariant};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
    CostAsc,
    CostDesc,
    Title,
}

impl SortOrder {
    pub const ALL: [SortOrder; 5] = [
        SortOrder::DateDesc,
        SortOrder::DateAsc,
        SortOrder::CostAsc,
        SortOrder::CostDesc,
        SortOrder::Title,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::DateDesc => "date-desc",
            SortOrder::DateAsc => "date-asc",
            SortOrder::CostAsc => "cost-asc",
            SortOrder::CostDesc => "cost-desc",
            SortOrder::Title => "title",
        }
    }

    fn compare(&self, a: &Event, b: &Event) -> Ordering {
        match self {
            SortOrder::DateDesc => b.starts_at().cmp(&a.starts_at()),
            SortOrder::DateAsc => a.starts_at().cmp(&b.starts_at()),
            SortOrder::CostAsc => a.cost.cmp(&b.cost),
            SortOrder::CostDesc => b.cost.cmp(&a.cost),
            SortOrder::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        }
    }

    /// Stable sort, ties keep their incoming order.
    pub fn sort(&self, events: &mut [Event]) {
        events.sort_by(|a, b| self.compare(a, b));
    }

    pub fn sorted<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        let mut refs: Vec<&Event> = events.iter().collect();
        refs.sort_by(|a, b| self.compare(a, b));
        refs
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|order| order.as_str() == s.trim())
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_events;

    fn order(sort: SortOrder) -> Vec<i32> {
        let mut events = sample_events();
        sort.sort(&mut events);
        events.iter().map(|e| e.event_id).collect()
    }

    #[test]
    fn test_date_orders() {
        assert_eq!(order(SortOrder::DateDesc), vec![4, 3, 2, 1]);
        assert_eq!(order(SortOrder::DateAsc), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_cost_sort_is_stable() {
        // Events 1 and 3 are both free.
        assert_eq!(order(SortOrder::CostAsc), vec![1, 3, 2, 4]);
        assert_eq!(order(SortOrder::CostDesc), vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_title_sort_ignores_case() {
        let mut events = sample_events();
        events[3].title = "ai ethics panel".to_string();
        SortOrder::Title.sort(&mut events);
        let ids: Vec<_> = events.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![1, 4, 2, 3]);
    }

    #[test]
    fn test_parse_round_trips_names() {
        for sort in SortOrder::ALL {
            assert_eq!(sort.to_string().parse::<SortOrder>(), Ok(sort));
        }
        assert!("popularity".parse::<SortOrder>().is_err());
    }
}
