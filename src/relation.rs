//! The fixed enumeration of semantic relations and their total precedence order.

/// A semantic relation between a source node and a target node.
///
/// Variants are listed in precedence order (most precedent first); `IDK` is
/// both the least precedent relation and the tombstone value used to delete
/// an entry from a mapping matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Relation {
    /// The source and target concepts are equivalent.
    Eq,
    /// The source concept is more general than the target's.
    Mg,
    /// The source concept is less general than the target's.
    Lg,
    /// The source and target concepts are disjoint.
    Dj,
    /// No relation is known, or the relation was deleted.
    #[default]
    Idk,
}

impl Relation {
    /// The precedence number of this relation (1 = most precedent).
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Eq => 1,
            Self::Mg => 2,
            Self::Lg => 3,
            Self::Dj => 4,
            Self::Idk => 5,
        }
    }

    /// Compares the precedence of two relations.
    ///
    /// Returns `1` if `a` is strictly more precedent than `b`, `-1` if `b` is
    /// strictly more precedent than `a`, and `0` if they are equally precedent.
    pub const fn compare_precedence(a: Self, b: Self) -> i8 {
        let ap = a.precedence();
        let bp = b.precedence();
        if ap < bp {
            1
        } else if ap > bp {
            -1
        } else {
            0
        }
    }

    /// Whether `a` is strictly more precedent than `b`.
    pub const fn is_precedent(a: Self, b: Self) -> bool {
        Self::compare_precedence(a, b) == 1
    }
}
