use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The seven join shapes the query builder offers.
///
/// The three `*Null` variants are exclusive joins: a regular outer join plus
/// an `IS NULL` predicate that keeps only the unmatched rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinKind {
    /// A ∩ B
    Inner,
    /// A ∪ (A ∩ B)
    Left,
    /// B ∪ (A ∩ B)
    Right,
    /// A ∪ B
    Full,
    /// A − B
    LeftNull,
    /// B − A
    RightNull,
    /// A △ B
    FullNull,
}

impl JoinKind {
    /// Every variant, in the order the builder lists them.
    pub const ALL: [JoinKind; 7] = [
        JoinKind::Inner,
        JoinKind::Left,
        JoinKind::Right,
        JoinKind::Full,
        JoinKind::LeftNull,
        JoinKind::RightNull,
        JoinKind::FullNull,
    ];

    /// SQL join keyword emitted before the right-hand table.
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left | JoinKind::LeftNull => "LEFT JOIN",
            JoinKind::Right | JoinKind::RightNull => "RIGHT JOIN",
            JoinKind::Full | JoinKind::FullNull => "FULL OUTER JOIN",
        }
    }

    /// True for the anti-join and symmetric-difference variants.
    pub fn is_exclusive(&self) -> bool {
        matches!(
            self,
            JoinKind::LeftNull | JoinKind::RightNull | JoinKind::FullNull
        )
    }

    /// Wire name (`LEFT_NULL`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL",
            JoinKind::LeftNull => "LEFT_NULL",
            JoinKind::RightNull => "RIGHT_NULL",
            JoinKind::FullNull => "FULL_NULL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JoinKind::Inner => "Inner Join",
            JoinKind::Left => "Left Join",
            JoinKind::Right => "Right Join",
            JoinKind::Full => "Full Outer Join",
            JoinKind::LeftNull => "Left Join (Exclude Matches)",
            JoinKind::RightNull => "Right Join (Exclude Matches)",
            JoinKind::FullNull => "Full Outer (Exclude Matches)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            JoinKind::Inner => "Returns only matching rows from both tables",
            JoinKind::Left => "All rows from left table + matching rows from right",
            JoinKind::Right => "All rows from right table + matching rows from left",
            JoinKind::Full => "All rows from both tables, matching where possible",
            JoinKind::LeftNull => "Rows from left table that have NO match in right",
            JoinKind::RightNull => "Rows from right table that have NO match in left",
            JoinKind::FullNull => "Rows that exist in only one table, not both",
        }
    }

    /// Set-theoretic reading of the join result.
    pub fn set_theory(&self) -> &'static str {
        match self {
            JoinKind::Inner => "A ∩ B (Intersection)",
            JoinKind::Left => "A ∪ (A ∩ B)",
            JoinKind::Right => "B ∪ (A ∩ B)",
            JoinKind::Full => "A ∪ B (Union)",
            JoinKind::LeftNull => "A - B (Left Difference)",
            JoinKind::RightNull => "B - A (Right Difference)",
            JoinKind::FullNull => "A △ B (Symmetric Difference)",
        }
    }

    pub fn use_case(&self) -> &'static str {
        match self {
            JoinKind::Inner => "Find customers who have placed orders",
            JoinKind::Left => "List all customers, including those without orders",
            JoinKind::Right => "List all orders, including orphaned ones",
            JoinKind::Full => "Complete dataset from both tables",
            JoinKind::LeftNull => "Find customers who have never placed an order",
            JoinKind::RightNull => "Find orphaned records in right table",
            JoinKind::FullNull => "Find mismatches between two tables",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        JoinKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown join type '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip_through_from_str() {
        for kind in JoinKind::ALL {
            assert_eq!(kind.as_str().parse::<JoinKind>(), Ok(kind));
        }
        assert_eq!("left-null".parse::<JoinKind>(), Ok(JoinKind::LeftNull));
        assert!("CROSS".parse::<JoinKind>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let kind: JoinKind = serde_json::from_str("\"FULL_NULL\"").unwrap();
        assert_eq!(kind, JoinKind::FullNull);
        assert_eq!(serde_json::to_string(&JoinKind::RightNull).unwrap(), "\"RIGHT_NULL\"");
    }

    #[test]
    fn test_exclusive_variants() {
        let exclusive: Vec<_> = JoinKind::ALL.into_iter().filter(|k| k.is_exclusive()).collect();
        assert_eq!(
            exclusive,
            vec![JoinKind::LeftNull, JoinKind::RightNull, JoinKind::FullNull]
        );
        assert_eq!(JoinKind::FullNull.keyword(), "FULL OUTER JOIN");
    }
}
