//! Derived view and summary over the board's tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{BoardTask, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
}

impl Filter {
    fn admits(self, task: &BoardTask) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => !task.completed,
            Filter::Completed => task.completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Latest `due_at` first.
    #[default]
    Newest,
    Oldest,
    /// High → Low.
    High,
    /// Low → High.
    Low,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub filter: Filter,
    #[serde(default)]
    pub sort: SortMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub high_priority: usize,
}

/// Search, then filter, then a stable sort. Tasks without a due time sort
/// as the Unix epoch.
pub fn derive<'a>(tasks: &'a [BoardTask], state: &ViewState) -> Vec<&'a BoardTask> {
    let needle = state.search.to_lowercase();
    let mut out: Vec<&BoardTask> = tasks
        .iter()
        .filter(|t| needle.is_empty() || t.title.to_lowercase().contains(&needle))
        .filter(|t| state.filter.admits(t))
        .collect();

    let due = |t: &BoardTask| t.due_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let rank = |t: &BoardTask| t.priority.rank();
    match state.sort {
        SortMode::Newest => out.sort_by(|a, b| due(b).cmp(&due(a))),
        SortMode::Oldest => out.sort_by(|a, b| due(a).cmp(&due(b))),
        SortMode::High => out.sort_by(|a, b| rank(b).cmp(&rank(a))),
        SortMode::Low => out.sort_by(|a, b| rank(a).cmp(&rank(b))),
    }
    out
}

/// Counts over the whole collection, independent of any view.
pub fn summarize(tasks: &[BoardTask]) -> Summary {
    let completed = tasks.iter().filter(|t| t.completed).count();
    Summary {
        total: tasks.len(),
        pending: tasks.len() - completed,
        completed,
        high_priority: tasks.iter().filter(|t| t.priority == Priority::High).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn task(title: &str, completed: bool, priority: Priority, due_day: Option<u32>) -> BoardTask {
        BoardTask {
            id: Uuid::new_v4(),
            title: title.to_string(),
            completed,
            created_at: Utc::now(),
            priority,
            due_at: due_day.map(|d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()),
        }
    }

    fn titles(view: &[&BoardTask]) -> Vec<String> {
        view.iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn newest_and_oldest_order_by_due_time() {
        let tasks = vec![
            task("t1", false, Priority::Medium, Some(1)),
            task("t2", false, Priority::Medium, Some(2)),
            task("none", false, Priority::Medium, None),
        ];
        let newest = derive(&tasks, &ViewState::default());
        assert_eq!(titles(&newest), ["t2", "t1", "none"]);

        let oldest = derive(
            &tasks,
            &ViewState {
                sort: SortMode::Oldest,
                ..Default::default()
            },
        );
        assert_eq!(titles(&oldest), ["none", "t1", "t2"]);
    }

    #[test]
    fn priority_sort_is_stable() {
        let tasks = vec![
            task("low", false, Priority::Low, None),
            task("med-a", false, Priority::Medium, None),
            task("high", false, Priority::High, None),
            task("med-b", false, Priority::Medium, None),
        ];
        let high = derive(
            &tasks,
            &ViewState {
                sort: SortMode::High,
                ..Default::default()
            },
        );
        assert_eq!(titles(&high), ["high", "med-a", "med-b", "low"]);

        let low = derive(
            &tasks,
            &ViewState {
                sort: SortMode::Low,
                ..Default::default()
            },
        );
        assert_eq!(titles(&low), ["low", "med-a", "med-b", "high"]);
    }

    #[test]
    fn search_then_filter() {
        let tasks = vec![
            task("Buy Milk", false, Priority::Medium, Some(3)),
            task("buy bread", true, Priority::Medium, Some(2)),
            task("Call mom", false, Priority::Medium, Some(1)),
        ];
        let state = ViewState {
            search: "BUY".into(),
            filter: Filter::Pending,
            sort: SortMode::Newest,
        };
        assert_eq!(titles(&derive(&tasks, &state)), ["Buy Milk"]);

        let state = ViewState {
            filter: Filter::Completed,
            ..Default::default()
        };
        assert_eq!(titles(&derive(&tasks, &state)), ["buy bread"]);
    }

    #[test]
    fn summary_ignores_the_view() {
        let tasks = vec![
            task("a", true, Priority::High, None),
            task("b", false, Priority::High, None),
            task("c", false, Priority::Low, None),
        ];
        assert_eq!(
            summarize(&tasks),
            Summary {
                total: 3,
                pending: 2,
                completed: 1,
                high_priority: 2,
            }
        );
    }

    #[test]
    fn view_state_parses_lowercase_modes() {
        let state: ViewState =
            serde_json::from_str(r#"{"search":"x","filter":"completed","sort":"high"}"#).unwrap();
        assert_eq!(state.filter, Filter::Completed);
        assert_eq!(state.sort, SortMode::High);
    }
}
