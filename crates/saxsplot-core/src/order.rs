//! The user-arranged curve hierarchy and its derived orders
//!
//! The arrangement is a two-level tree: groups in display order, each
//! owning its curves in display order, plus an "unassigned" bucket.
//! Rust ownership makes curve membership exclusive by construction.
//!
//! One depth-first traversal of this tree yields both derived views:
//! the flattening is the canonical z-order (later entries draw on top),
//! and the same flattening, optionally reversed as a whole, is the
//! legend order. The two are never maintained separately.

use crate::curve::Curve;
use crate::error::{CoreError, CoreResult};
use crate::group::Group;
use serde::{Deserialize, Serialize};

/// Address of a curve inside the arrangement
///
/// `group: None` addresses the unassigned bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveSlot {
    pub group: Option<usize>,
    pub index: usize,
}

impl CurveSlot {
    /// Slot inside a group
    pub fn in_group(group: usize, index: usize) -> Self {
        Self {
            group: Some(group),
            index,
        }
    }

    /// Slot in the unassigned bucket
    pub fn unassigned(index: usize) -> Self {
        Self { group: None, index }
    }
}

/// One entry of the flattened arrangement
#[derive(Clone, Copy, Debug)]
pub struct FlatEntry<'a> {
    pub curve: &'a Curve,
    pub group: Option<&'a Group>,

    /// Position of the curve inside its own container; this is the
    /// index used for palette color assignment.
    pub context_index: usize,
}

/// The hierarchical arrangement of groups and curves
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Arrangement {
    /// Groups in display order
    #[serde(default)]
    pub groups: Vec<Group>,

    /// Curves not belonging to any group, in display order
    #[serde(default)]
    pub unassigned: Vec<Curve>,
}

impl Arrangement {
    /// Total number of curves across all containers
    pub fn curve_count(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum::<usize>() + self.unassigned.len()
    }

    /// Depth-first flattening: groups in order, then the unassigned bucket
    ///
    /// This is the canonical z-order; later entries draw on top.
    pub fn flatten(&self) -> Vec<FlatEntry<'_>> {
        let mut entries = Vec::with_capacity(self.curve_count());
        for group in &self.groups {
            for (index, curve) in group.curves.iter().enumerate() {
                entries.push(FlatEntry {
                    curve,
                    group: Some(group),
                    context_index: index,
                });
            }
        }
        for (index, curve) in self.unassigned.iter().enumerate() {
            entries.push(FlatEntry {
                curve,
                group: None,
                context_index: index,
            });
        }
        entries
    }

    /// The flattening in legend order: identical to [`flatten`], reversed
    /// as a whole when `reversed` is set
    ///
    /// [`flatten`]: Arrangement::flatten
    pub fn legend_order(&self, reversed: bool) -> Vec<FlatEntry<'_>> {
        let mut entries = self.flatten();
        if reversed {
            entries.reverse();
        }
        entries
    }

    /// Borrow a curve by slot
    pub fn curve(&self, slot: CurveSlot) -> Option<&Curve> {
        match slot.group {
            Some(g) => self.groups.get(g)?.curves.get(slot.index),
            None => self.unassigned.get(slot.index),
        }
    }

    /// Mutably borrow a curve by slot
    pub fn curve_mut(&mut self, slot: CurveSlot) -> Option<&mut Curve> {
        match slot.group {
            Some(g) => self.groups.get_mut(g)?.curves.get_mut(slot.index),
            None => self.unassigned.get_mut(slot.index),
        }
    }

    /// Append a group, returning its index
    pub fn add_group(&mut self, group: Group) -> usize {
        self.groups.push(group);
        self.groups.len() - 1
    }

    /// Append a curve to the unassigned bucket
    pub fn add_unassigned(&mut self, curve: Curve) {
        self.unassigned.push(curve);
    }

    /// Remove and return a curve, detaching it from its container
    pub fn take_curve(&mut self, slot: CurveSlot) -> Option<Curve> {
        match slot.group {
            Some(g) => self.groups.get_mut(g)?.remove_curve(slot.index),
            None => {
                if slot.index < self.unassigned.len() {
                    Some(self.unassigned.remove(slot.index))
                } else {
                    None
                }
            }
        }
    }

    /// Insert a curve at a slot (position clamped to the container size)
    ///
    /// Returns the curve back when the target group does not exist.
    pub fn insert_curve(&mut self, slot: CurveSlot, curve: Curve) -> Result<(), Curve> {
        match slot.group {
            Some(g) => match self.groups.get_mut(g) {
                Some(group) => {
                    group.insert_curve(slot.index, curve);
                    Ok(())
                }
                None => Err(curve),
            },
            None => {
                let index = slot.index.min(self.unassigned.len());
                self.unassigned.insert(index, curve);
                Ok(())
            }
        }
    }

    /// Move a curve to a new slot
    ///
    /// The destination is interpreted after the curve has been removed
    /// from its source container. Sibling order elsewhere is untouched.
    /// Returns None and leaves the arrangement unchanged when either
    /// slot is invalid.
    pub fn move_curve(&mut self, from: CurveSlot, to: CurveSlot) -> Option<()> {
        if let Some(g) = to.group {
            if g >= self.groups.len() {
                return None;
            }
        }
        let curve = self.take_curve(from)?;
        // Target group existence was checked above.
        self.insert_curve(to, curve).ok()
    }

    /// Detach a curve from its group into the unassigned bucket (at the end)
    pub fn detach_curve(&mut self, from: CurveSlot) -> Option<()> {
        let curve = self.take_curve(from)?;
        self.unassigned.push(curve);
        Some(())
    }

    /// Reorder a group among its siblings
    pub fn move_group(&mut self, from: usize, to: usize) -> Option<()> {
        if from >= self.groups.len() {
            return None;
        }
        let group = self.groups.remove(from);
        let to = to.min(self.groups.len());
        self.groups.insert(to, group);
        Some(())
    }

    /// Delete a group, returning its members to the unassigned bucket
    pub fn remove_group(&mut self, index: usize) -> Option<()> {
        if index >= self.groups.len() {
            return None;
        }
        let group = self.groups.remove(index);
        self.unassigned.extend(group.curves);
        Some(())
    }

    /// Permanently remove a curve
    pub fn remove_curve(&mut self, slot: CurveSlot) -> Option<Curve> {
        self.take_curve(slot)
    }

    /// Create one group per selected curve with multipliers assigned as
    /// successive powers of ten (1, 10, 100, ...) in selection order
    ///
    /// Each group is named after its sole member. Slots must be distinct
    /// and valid; otherwise the arrangement is left unchanged.
    pub fn auto_group(&mut self, selection: &[CurveSlot]) -> CoreResult<()> {
        for (i, slot) in selection.iter().enumerate() {
            if self.curve(*slot).is_none() {
                return Err(CoreError::InvalidParameter(format!(
                    "auto-group selection refers to a missing curve (slot {i})"
                )));
            }
            if selection[..i].contains(slot) {
                return Err(CoreError::InvalidParameter(
                    "auto-group selection contains duplicate slots".to_string(),
                ));
            }
        }

        // Extract in descending index order per container so earlier
        // removals do not shift the remaining slots.
        let mut order: Vec<usize> = (0..selection.len()).collect();
        order.sort_by(|&a, &b| {
            let (sa, sb) = (selection[a], selection[b]);
            (sb.group, sb.index).cmp(&(sa.group, sa.index))
        });

        let mut extracted: Vec<Option<Curve>> = (0..selection.len()).map(|_| None).collect();
        for i in order {
            extracted[i] = self.take_curve(selection[i]);
        }

        for (i, curve) in extracted.into_iter().enumerate() {
            // Validated above; extraction cannot miss.
            let Some(curve) = curve else { continue };
            let multiplier = 10f64.powi(i as i32);
            let mut group = Group::with_multiplier(curve.name.clone(), multiplier);
            group.add_curve(curve);
            self.groups.push(group);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(name: &str) -> Curve {
        Curve::placeholder(name, None)
    }

    fn sample() -> Arrangement {
        let mut arr = Arrangement::default();
        let mut g1 = Group::new("g1");
        g1.add_curve(curve("a"));
        g1.add_curve(curve("b"));
        let mut g2 = Group::new("g2");
        g2.add_curve(curve("c"));
        arr.add_group(g1);
        arr.add_group(g2);
        arr.add_unassigned(curve("u1"));
        arr.add_unassigned(curve("u2"));
        arr
    }

    fn names<'a>(entries: &'a [FlatEntry<'a>]) -> Vec<&'a str> {
        entries.iter().map(|e| e.curve.name.as_str()).collect()
    }

    #[test]
    fn test_flatten_is_depth_first() {
        let arr = sample();
        assert_eq!(names(&arr.flatten()), vec!["a", "b", "c", "u1", "u2"]);
    }

    #[test]
    fn test_legend_order_reversal_is_exact() {
        let arr = sample();
        let forward_entries = arr.legend_order(false);
        let forward = names(&forward_entries);
        let reversed_entries = arr.legend_order(true);
        let mut reversed = names(&reversed_entries);
        reversed.reverse();
        assert_eq!(forward, reversed);

        // Reversing the legend leaves the z-order untouched.
        assert_eq!(names(&arr.flatten()), forward);
    }

    #[test]
    fn test_context_index_restarts_per_container() {
        let arr = sample();
        let entries = arr.flatten();
        assert_eq!(entries[0].context_index, 0); // a
        assert_eq!(entries[1].context_index, 1); // b
        assert_eq!(entries[2].context_index, 0); // c, new group
        assert_eq!(entries[3].context_index, 0); // u1, unassigned
    }

    #[test]
    fn test_move_curve_between_groups() {
        let mut arr = sample();
        arr.move_curve(CurveSlot::in_group(0, 0), CurveSlot::in_group(1, 0))
            .unwrap();
        assert_eq!(names(&arr.flatten()), vec!["b", "a", "c", "u1", "u2"]);
    }

    #[test]
    fn test_move_curve_to_unassigned_position() {
        let mut arr = sample();
        arr.move_curve(CurveSlot::in_group(0, 1), CurveSlot::unassigned(0))
            .unwrap();
        assert_eq!(names(&arr.flatten()), vec!["a", "c", "b", "u1", "u2"]);
    }

    #[test]
    fn test_move_curve_invalid_target_is_noop() {
        let mut arr = sample();
        assert!(arr
            .move_curve(CurveSlot::in_group(0, 0), CurveSlot::in_group(9, 0))
            .is_none());
        assert_eq!(names(&arr.flatten()), vec!["a", "b", "c", "u1", "u2"]);
    }

    #[test]
    fn test_detach_curve() {
        let mut arr = sample();
        arr.detach_curve(CurveSlot::in_group(1, 0)).unwrap();
        assert!(arr.groups[1].is_empty());
        assert_eq!(arr.unassigned.last().unwrap().name, "c");
    }

    #[test]
    fn test_move_group() {
        let mut arr = sample();
        arr.move_group(0, 1).unwrap();
        assert_eq!(names(&arr.flatten()), vec!["c", "a", "b", "u1", "u2"]);
    }

    #[test]
    fn test_remove_group_returns_members() {
        let mut arr = sample();
        arr.remove_group(0).unwrap();
        assert_eq!(arr.groups.len(), 1);
        assert_eq!(names(&arr.flatten()), vec!["c", "u1", "u2", "a", "b"]);
    }

    #[test]
    fn test_auto_group_powers_of_ten() {
        let mut arr = Arrangement::default();
        arr.add_unassigned(curve("A"));
        arr.add_unassigned(curve("B"));
        arr.add_unassigned(curve("C"));

        arr.auto_group(&[
            CurveSlot::unassigned(0),
            CurveSlot::unassigned(1),
            CurveSlot::unassigned(2),
        ])
        .unwrap();

        assert!(arr.unassigned.is_empty());
        let multipliers: Vec<f64> = arr.groups.iter().map(|g| g.multiplier).collect();
        assert_eq!(multipliers, vec![1.0, 10.0, 100.0]);
        let names: Vec<&str> = arr.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(arr.groups[1].curves[0].name, "B");
    }

    #[test]
    fn test_auto_group_respects_selection_order() {
        let mut arr = Arrangement::default();
        arr.add_unassigned(curve("A"));
        arr.add_unassigned(curve("B"));

        // Reverse selection: B gets x1, A gets x10.
        arr.auto_group(&[CurveSlot::unassigned(1), CurveSlot::unassigned(0)])
            .unwrap();

        assert_eq!(arr.groups[0].name, "B");
        assert_eq!(arr.groups[0].multiplier, 1.0);
        assert_eq!(arr.groups[1].name, "A");
        assert_eq!(arr.groups[1].multiplier, 10.0);
    }

    #[test]
    fn test_auto_group_rejects_duplicates() {
        let mut arr = sample();
        let err = arr.auto_group(&[CurveSlot::unassigned(0), CurveSlot::unassigned(0)]);
        assert!(matches!(err, Err(CoreError::InvalidParameter(_))));
        // Unchanged on failure.
        assert_eq!(arr.curve_count(), 5);
    }
}
