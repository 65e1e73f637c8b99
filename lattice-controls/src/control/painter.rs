//! Painters
//!
//! A painter is a declarative repaint rule: the set of properties it reads
//! and a function that writes them to the rendered element.
//!
//! # How Repainting Works
//!
//! 1. The first paint after structure building runs every painter.
//!
//! 2. Later repaints receive the [`Changes`] produced by a property update.
//!    A painter runs only if one of its fields is in the change set.
//!
//! 3. Painters run in declaration order. Inherited painters come first,
//!    then the control's own.
//!
//! Painters never depend on one another and must be idempotent: running one
//! again with unchanged state leaves the document as it was.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use smallvec::SmallVec;

use super::helper::ControlHelper;
use super::property::{Changes, Field};
use crate::error::Result;

/// Writes a control's current state to its rendered element.
pub type PaintFn<S> = fn(&S, &ControlHelper) -> Result<()>;

/// A repaint rule.
pub struct Painter<S> {
    name: &'static str,

    /// Properties this painter reads.
    fields: SmallVec<[Field; 4]>,

    paint: PaintFn<S>,

    /// Number of times the painter has run.
    runs: AtomicUsize,
}

impl<S> Painter<S> {
    pub fn new(name: &'static str, fields: &[Field], paint: PaintFn<S>) -> Self {
        Self {
            name,
            fields: SmallVec::from_slice(fields),
            paint,
            runs: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Whether this painter must run for `changes` (`None` is a full paint).
    pub fn is_affected(&self, changes: Option<&Changes>) -> bool {
        match changes {
            None => true,
            Some(changes) => changes.touches(&self.fields),
        }
    }

    /// Run the painter unconditionally.
    pub fn run(&self, state: &S, helper: &ControlHelper) -> Result<()> {
        (self.paint)(state, helper)?;
        self.runs.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn run_count(&self) -> usize {
        self.runs.load(Ordering::Relaxed)
    }
}

impl<S> fmt::Debug for Painter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Painter")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("run_count", &self.run_count())
            .finish()
    }
}

/// An ordered list of painters for one control type.
pub struct PainterSet<S> {
    painters: Vec<Painter<S>>,
}

impl<S> PainterSet<S> {
    pub fn new(painters: Vec<Painter<S>>) -> Self {
        Self { painters }
    }

    /// Extend an inherited painter list with a control's own painters.
    pub fn compose(base: Vec<Painter<S>>, own: Vec<Painter<S>>) -> Self {
        let mut painters = base;
        painters.extend(own);
        Self { painters }
    }

    /// Run the painters affected by `changes`, in order.
    ///
    /// Returns the number of painters that ran.
    pub fn repaint(
        &self,
        state: &S,
        helper: &ControlHelper,
        changes: Option<&Changes>,
    ) -> Result<usize> {
        let mut fired = 0;
        for painter in &self.painters {
            if !painter.is_affected(changes) {
                continue;
            }
            tracing::trace!(
                control = %helper.control_id(),
                painter = painter.name(),
                "running painter"
            );
            painter.run(state, helper)?;
            fired += 1;
        }

        tracing::debug!(
            control = %helper.control_id(),
            full = changes.is_none(),
            changed = ?changes.map(|c| c.keys().map(|k| k.to_string()).collect::<Vec<_>>()),
            fired,
            "repainted"
        );
        Ok(fired)
    }

    pub fn get(&self, name: &str) -> Option<&Painter<S>> {
        self.painters.iter().find(|painter| painter.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Painter<S>> {
        self.painters.iter()
    }

    pub fn len(&self) -> usize {
        self.painters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.painters.is_empty()
    }
}

impl<S> fmt::Debug for PainterSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.painters).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct Log {
        painted: Mutex<Vec<&'static str>>,
    }

    fn paint_value(log: &Log, _: &ControlHelper) -> Result<()> {
        log.painted.lock().push("value");
        Ok(())
    }

    fn paint_flags(log: &Log, _: &ControlHelper) -> Result<()> {
        log.painted.lock().push("flags");
        Ok(())
    }

    fn painters() -> PainterSet<Log> {
        PainterSet::compose(
            vec![Painter::new("value", &[Field::RawValue, Field::Checked], paint_value)],
            vec![Painter::new("flags", &[Field::Disabled, Field::ReadOnly], paint_flags)],
        )
    }

    #[test]
    fn full_paint_runs_everything_in_order() {
        let helper = ControlHelper::new(Document::new(), "test");
        let log = Log::default();

        let fired = painters().repaint(&log, &helper, None).unwrap();

        assert_eq!(fired, 2);
        assert_eq!(*log.painted.lock(), vec!["value", "flags"]);
    }

    #[test]
    fn partial_paint_runs_only_affected() {
        let helper = ControlHelper::new(Document::new(), "test");
        let log = Log::default();
        let set = painters();

        let mut changes = Changes::new();
        changes.record(Field::Disabled.into(), json!(false), json!(true));
        set.repaint(&log, &helper, Some(&changes)).unwrap();

        assert_eq!(*log.painted.lock(), vec!["flags"]);
        assert_eq!(set.get("value").unwrap().run_count(), 0);
        assert_eq!(set.get("flags").unwrap().run_count(), 1);
    }

    #[test]
    fn empty_changes_run_nothing() {
        let helper = ControlHelper::new(Document::new(), "test");
        let log = Log::default();

        let fired = painters()
            .repaint(&log, &helper, Some(&Changes::new()))
            .unwrap();

        assert_eq!(fired, 0);
        assert!(log.painted.lock().is_empty());
    }
}
