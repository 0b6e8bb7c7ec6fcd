//! Problem category normalization.
//!
//! Categories arrive as free text from the problem catalogue ("DP",
//! "Dynamic Programming", "dynamic-programming"). Normalization lowercases,
//! folds separators, and collapses synonyms onto one `ProblemCategory`.

use serde::{Deserialize, Serialize};

use crate::taxonomy::normalize_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemCategory {
    Arrays,
    Strings,
    TwoPointers,
    SlidingWindow,
    BinarySearch,
    DynamicProgramming,
    Greedy,
    Graph,
    Tree,
    Recursion,
    Math,
    Sorting,
    HashTable,
    Other,
}

/// Normalized synonym → category.
const SYNONYMS: &[(&str, ProblemCategory)] = &[
    ("array", ProblemCategory::Arrays),
    ("arrays", ProblemCategory::Arrays),
    ("matrix", ProblemCategory::Arrays),
    ("string", ProblemCategory::Strings),
    ("strings", ProblemCategory::Strings),
    ("two_pointers", ProblemCategory::TwoPointers),
    ("two_pointer", ProblemCategory::TwoPointers),
    ("sliding_window", ProblemCategory::SlidingWindow),
    ("binary_search", ProblemCategory::BinarySearch),
    ("bisection", ProblemCategory::BinarySearch),
    ("dp", ProblemCategory::DynamicProgramming),
    ("dynamic_programming", ProblemCategory::DynamicProgramming),
    ("memoization", ProblemCategory::DynamicProgramming),
    ("greedy", ProblemCategory::Greedy),
    ("graph", ProblemCategory::Graph),
    ("graphs", ProblemCategory::Graph),
    ("bfs", ProblemCategory::Graph),
    ("dfs", ProblemCategory::Graph),
    ("shortest_path", ProblemCategory::Graph),
    ("tree", ProblemCategory::Tree),
    ("trees", ProblemCategory::Tree),
    ("binary_tree", ProblemCategory::Tree),
    ("bst", ProblemCategory::Tree),
    ("recursion", ProblemCategory::Recursion),
    ("backtracking", ProblemCategory::Recursion),
    ("math", ProblemCategory::Math),
    ("number_theory", ProblemCategory::Math),
    ("sorting", ProblemCategory::Sorting),
    ("sort", ProblemCategory::Sorting),
    ("hash_table", ProblemCategory::HashTable),
    ("hash_map", ProblemCategory::HashTable),
    ("hashing", ProblemCategory::HashTable),
    ("hashmap", ProblemCategory::HashTable),
];

impl ProblemCategory {
    /// Every named category plus `Other`.
    pub const ALL: [ProblemCategory; 14] = [
        ProblemCategory::Arrays,
        ProblemCategory::Strings,
        ProblemCategory::TwoPointers,
        ProblemCategory::SlidingWindow,
        ProblemCategory::BinarySearch,
        ProblemCategory::DynamicProgramming,
        ProblemCategory::Greedy,
        ProblemCategory::Graph,
        ProblemCategory::Tree,
        ProblemCategory::Recursion,
        ProblemCategory::Math,
        ProblemCategory::Sorting,
        ProblemCategory::HashTable,
        ProblemCategory::Other,
    ];

    /// Normalize free-text into a category. Unknown text maps to `Other`.
    pub fn normalize(raw: &str) -> Self {
        let key = normalize_label(raw);
        SYNONYMS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, cat)| *cat)
            .unwrap_or(Self::Other)
    }

    /// A canonical text form accepted by `normalize`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arrays => "arrays",
            Self::Strings => "strings",
            Self::TwoPointers => "two_pointers",
            Self::SlidingWindow => "sliding_window",
            Self::BinarySearch => "binary_search",
            Self::DynamicProgramming => "dynamic_programming",
            Self::Greedy => "greedy",
            Self::Graph => "graph",
            Self::Tree => "tree",
            Self::Recursion => "recursion",
            Self::Math => "math",
            Self::Sorting => "sorting",
            Self::HashTable => "hash_table",
            Self::Other => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dp_synonyms_collapse() {
        for raw in ["dp", "DP", "Dynamic Programming", "dynamic-programming", " memoization "] {
            assert_eq!(
                ProblemCategory::normalize(raw),
                ProblemCategory::DynamicProgramming,
                "{raw}"
            );
        }
    }

    #[test]
    fn test_unknown_and_empty_fall_back_to_other() {
        assert_eq!(ProblemCategory::normalize(""), ProblemCategory::Other);
        assert_eq!(ProblemCategory::normalize("geometry"), ProblemCategory::Other);
    }

    #[test]
    fn test_canonical_names_normalize_to_themselves() {
        for cat in ProblemCategory::ALL {
            assert_eq!(ProblemCategory::normalize(cat.as_str()), cat);
        }
    }
}
