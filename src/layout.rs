//! Column layout for same-day overlapping occurrences.
//!
//! Assigns each of a day's occurrences a column and a group width so the UI
//! can render overlapping blocks side by side. Greedy lowest-free-column
//! placement, then a fixpoint pass that equalizes the width across
//! transitively connected overlap groups (A overlaps B and B overlaps C
//! must leave all three the same width even when A and C are disjoint).

use std::collections::HashMap;

use serde::Serialize;

use crate::occurrence::Occurrence;

/// Column assignment for one occurrence in a day's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub column: usize,
    pub total_columns: usize,
}

/// Lay out one date's occurrences. Keyed by `Occurrence::key`.
///
/// Guarantees: occurrences with overlapping intervals never share a column,
/// and every member of a connected overlap group reports the same
/// `total_columns`.
pub fn layout(occurrences: &[Occurrence]) -> HashMap<String, Placement> {
    struct Placed {
        idx: usize,
        column: usize,
        total: usize,
    }

    // Sort by start time, ties by owner then backing record for stability
    let mut order: Vec<usize> = (0..occurrences.len()).collect();
    order.sort_by(|&a, &b| {
        occurrences[a]
            .start
            .cmp(&occurrences[b].start)
            .then_with(|| occurrences[a].owner.id.cmp(&occurrences[b].owner.id))
            .then_with(|| occurrences[a].source_id().cmp(occurrences[b].source_id()))
    });

    let mut placed: Vec<Placed> = Vec::with_capacity(occurrences.len());
    for idx in order {
        let occ = &occurrences[idx];
        let neighbors: Vec<usize> = placed
            .iter()
            .enumerate()
            .filter(|(_, p)| occurrences[p.idx].overlaps(occ))
            .map(|(i, _)| i)
            .collect();

        let mut column = 0;
        while neighbors.iter().any(|&i| placed[i].column == column) {
            column += 1;
        }

        // tentative group width: running max of column + 1
        let mut total = column + 1;
        for &i in &neighbors {
            total = total.max(placed[i].total);
        }
        for &i in &neighbors {
            placed[i].total = total;
        }
        placed.push(Placed { idx, column, total });
    }

    // Fixpoint pass: widths must agree across transitively linked groups.
    // Daily counts are small, repeated O(n^2) scans are fine.
    loop {
        let mut changed = false;
        for a in 0..placed.len() {
            for b in (a + 1)..placed.len() {
                if !occurrences[placed[a].idx].overlaps(&occurrences[placed[b].idx]) {
                    continue;
                }
                let widest = placed[a].total.max(placed[b].total);
                if placed[a].total != widest {
                    placed[a].total = widest;
                    changed = true;
                }
                if placed[b].total != widest {
                    placed[b].total = widest;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    placed
        .into_iter()
        .map(|p| {
            (
                occurrences[p.idx].key(),
                Placement {
                    column: p.column,
                    total_columns: p.total,
                },
            )
        })
        .collect()
}
