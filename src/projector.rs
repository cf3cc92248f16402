use crate::model::{Filter, Task};
use std::collections::BTreeSet;

/// Read-only view over a store snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Projector<'a> {
    tasks: &'a [Task],
    filter: &'a Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub total: usize,
    pub remaining: usize,
    pub percent_complete: u8,
}

impl<'a> Projector<'a> {
    pub fn new(tasks: &'a [Task], filter: &'a Filter) -> Self {
        Projector { tasks, filter }
    }

    /// Newest first, then filtered. Tasks created in the same millisecond
    /// keep reverse insertion order.
    pub fn visible_tasks(&self) -> Vec<&'a Task> {
        let mut items: Vec<&Task> = self.tasks.iter().rev().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.retain(|t| self.filter.matches(t));
        items
    }

    pub fn stats(&self) -> Stats {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        let percent_complete = if total == 0 {
            0
        } else {
            // round half up: floor((200 * c + t) / (2 * t))
            ((200 * completed + total) / (2 * total)) as u8
        };
        Stats {
            total,
            remaining: total - completed,
            percent_complete,
        }
    }

    /// Distinct categories present in the collection, sorted.
    pub fn categories(&self) -> Vec<&'a str> {
        self.tasks
            .iter()
            .map(|t| t.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
