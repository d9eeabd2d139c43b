//! Deterministic run order for a profile's tasks

use crate::profile::Task;

/// Sort tasks ascending by order.
///
/// Tasks sharing an order run in task-name order, so the result depends only
/// on the set of tasks and never on how storage happened to return them.
pub fn order_tasks(tasks: impl IntoIterator<Item = Task>) -> Vec<Task> {
    let mut tasks: Vec<Task> = tasks.into_iter().collect();
    tasks.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
    tasks
}
