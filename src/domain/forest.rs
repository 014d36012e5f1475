//! On-demand task forest
//!
//! The snapshot keeps hierarchy as parent pointers scattered across flat
//! records. The exporter needs a tree: parents before children, children in
//! input order, and a depth for every task. `TaskForest` builds that view as
//! an index arena over the task slice without copying any records.
//!
//! Malformed inputs are tolerated, never rejected: a parent pointer that
//! resolves to nothing (or to the task itself, or into a pointer cycle)
//! promotes the task to root.

use std::collections::HashMap;

use super::project::Task;

/// An ordered task with its computed position in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestEntry {
    /// Index into the original task slice
    pub index: usize,

    /// Depth in the hierarchy, root = 1
    pub outline_level: u32,

    /// Index of the parent task, if any
    pub parent: Option<usize>,
}

/// Parent/child structure derived from a flat task slice
#[derive(Debug)]
pub struct TaskForest {
    parent_of: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl TaskForest {
    /// Builds the forest for a slice of tasks
    ///
    /// Ties parent pointers to indices by task id (first occurrence wins for
    /// duplicate ids), then breaks self-references, dangling references and
    /// pointer cycles by promoting the offending tasks to roots.
    pub fn build(tasks: &[Task]) -> Self {
        let mut by_id: HashMap<&str, usize> = HashMap::new();
        for (i, task) in tasks.iter().enumerate() {
            by_id.entry(task.id.as_str()).or_insert(i);
        }

        let mut parent_of: Vec<Option<usize>> = tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                task.parent
                    .as_deref()
                    .and_then(|p| by_id.get(p).copied())
                    .filter(|&p| p != i)
            })
            .collect();

        // Break parent-pointer cycles: walk each chain upward and demote the
        // current task to root if we revisit it.
        for i in 0..parent_of.len() {
            let mut seen = vec![false; parent_of.len()];
            let mut cursor = i;
            seen[cursor] = true;
            while let Some(p) = parent_of[cursor] {
                if seen[p] {
                    parent_of[i] = None;
                    break;
                }
                seen[p] = true;
                cursor = p;
            }
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
        let mut roots = Vec::new();
        for (i, parent) in parent_of.iter().enumerate() {
            match parent {
                Some(p) => children[*p].push(i),
                None => roots.push(i),
            }
        }

        Self {
            parent_of,
            children,
            roots,
        }
    }

    /// Index of a task's parent, if it has one
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.parent_of.get(index).copied().flatten()
    }

    /// True if any task points at this one as its parent
    pub fn is_summary(&self, index: usize) -> bool {
        self.children
            .get(index)
            .map(|c| !c.is_empty())
            .unwrap_or(false)
    }

    /// Tasks in document order: pre-order walk, roots and siblings in input
    /// order, each entry carrying its outline level (root = 1)
    pub fn ordered(&self) -> Vec<ForestEntry> {
        let mut out = Vec::with_capacity(self.parent_of.len());
        // Reverse so the explicit stack pops siblings in input order
        let mut stack: Vec<(usize, u32, Option<usize>)> = self
            .roots
            .iter()
            .rev()
            .map(|&i| (i, 1, None))
            .collect();

        while let Some((index, outline_level, parent)) = stack.pop() {
            out.push(ForestEntry {
                index,
                outline_level,
                parent,
            });
            for &child in self.children[index].iter().rev() {
                stack.push((child, outline_level + 1, Some(index)));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, parent: Option<&str>) -> Task {
        let mut t = Task::new(id, id.to_uppercase());
        t.parent = parent.map(String::from);
        t
    }

    fn ordered_ids<'a>(tasks: &'a [Task], forest: &TaskForest) -> Vec<&'a str> {
        forest
            .ordered()
            .iter()
            .map(|e| tasks[e.index].id.as_str())
            .collect()
    }

    #[test]
    fn flat_tasks_are_all_roots() {
        let tasks = vec![task("a", None), task("b", None), task("c", None)];
        let forest = TaskForest::build(&tasks);

        let entries = forest.ordered();
        assert_eq!(ordered_ids(&tasks, &forest), vec!["a", "b", "c"]);
        assert!(entries.iter().all(|e| e.outline_level == 1));
        assert!(entries.iter().all(|e| e.parent.is_none()));
    }

    #[test]
    fn children_follow_parents() {
        let tasks = vec![
            task("p", None),
            task("c1", Some("p")),
            task("q", None),
            task("c2", Some("p")),
        ];
        let forest = TaskForest::build(&tasks);

        // Children in input order, attached behind their parent
        assert_eq!(ordered_ids(&tasks, &forest), vec!["p", "c1", "c2", "q"]);

        let entries = forest.ordered();
        assert_eq!(entries[1].outline_level, 2);
        assert_eq!(entries[1].parent, Some(0));
        assert!(forest.is_summary(0));
        assert!(!forest.is_summary(1));
    }

    #[test]
    fn nested_levels() {
        let tasks = vec![
            task("a", None),
            task("b", Some("a")),
            task("c", Some("b")),
        ];
        let forest = TaskForest::build(&tasks);

        let levels: Vec<u32> = forest.ordered().iter().map(|e| e.outline_level).collect();
        assert_eq!(levels, vec![1, 2, 3]);
    }

    #[test]
    fn dangling_parent_promotes_to_root() {
        let tasks = vec![task("a", Some("missing")), task("b", None)];
        let forest = TaskForest::build(&tasks);

        let entries = forest.ordered();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.outline_level == 1));
    }

    #[test]
    fn self_parent_promotes_to_root() {
        let tasks = vec![task("a", Some("a"))];
        let forest = TaskForest::build(&tasks);

        assert_eq!(forest.parent(0), None);
        assert_eq!(forest.ordered()[0].outline_level, 1);
    }

    #[test]
    fn parent_cycle_is_broken() {
        let tasks = vec![task("a", Some("b")), task("b", Some("a"))];
        let forest = TaskForest::build(&tasks);

        // At least one cycle member becomes a root and every task is emitted
        // exactly once.
        let entries = forest.ordered();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.outline_level == 1));
    }

    #[test]
    fn duplicate_ids_resolve_to_first_occurrence() {
        let tasks = vec![task("a", None), task("a", None), task("b", Some("a"))];
        let forest = TaskForest::build(&tasks);

        assert_eq!(forest.parent(2), Some(0));
    }
}
