//! Per-widget event filters.
//!
//! Filters see an event before the widget routes it. They run newest first
//! and the first one returning `true` consumes the event.

use trellis_core::logging::targets;

use crate::error::{WidgetError, WidgetResult};
use crate::event::Event;
use crate::widget::handler::WidgetCx;
use crate::widget::{WidgetId, WidgetTree};

/// Identifies an installed filter for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterId(pub(crate) u64);

/// A filter closure. `cx.id()` is the widget the event is addressed to.
pub type EventFilter = Box<dyn FnMut(&mut WidgetCx<'_>, &mut Event) -> bool>;

/// The filters of one widget.
///
/// While the chain runs, the closures are detached from the node so they can
/// receive the tree. Filters added or removed during that time are applied
/// when the chain is reattached.
#[derive(Default)]
pub(crate) struct FilterChain {
    filters: Vec<(FilterId, EventFilter)>,
    /// Ids of the detached filters, while a run is in progress.
    running: Option<Vec<FilterId>>,
    pending_removals: Vec<FilterId>,
}

impl FilterChain {
    pub(crate) fn add(&mut self, id: FilterId, filter: EventFilter) {
        self.filters.push((id, filter));
    }

    pub(crate) fn remove(&mut self, id: FilterId) -> bool {
        if let Some(pos) = self.filters.iter().position(|(fid, _)| *fid == id) {
            self.filters.remove(pos);
            return true;
        }
        if self.running.as_ref().is_some_and(|ids| ids.contains(&id)) {
            self.pending_removals.push(id);
            return true;
        }
        false
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.filters.len() + self.running.as_ref().map_or(0, Vec::len) - self.pending_removals.len()
    }

    pub(crate) fn detach(&mut self) -> Vec<(FilterId, EventFilter)> {
        let filters = std::mem::take(&mut self.filters);
        self.running = Some(filters.iter().map(|(id, _)| *id).collect());
        filters
    }

    pub(crate) fn reattach(&mut self, mut filters: Vec<(FilterId, EventFilter)>) {
        self.running = None;
        let removed = std::mem::take(&mut self.pending_removals);
        filters.retain(|(id, _)| !removed.contains(id));
        let added = std::mem::replace(&mut self.filters, filters);
        self.filters.extend(added);
    }
}

impl WidgetTree {
    /// Install a filter on widget `id`. It runs before any filter installed
    /// earlier.
    pub fn add_event_filter<F>(&mut self, id: WidgetId, filter: F) -> WidgetResult<FilterId>
    where
        F: FnMut(&mut WidgetCx<'_>, &mut Event) -> bool + 'static,
    {
        let filter_id = FilterId(self.next_filter_id);
        let node = self.nodes.get_mut(id).ok_or(WidgetError::StaleWidget(id))?;
        node.filters.add(filter_id, Box::new(filter));
        self.next_filter_id += 1;
        tracing::trace!(target: targets::ROUTER, ?id, filter = filter_id.0, "event filter added");
        Ok(filter_id)
    }

    /// Remove a filter. Returns `false` if it is not installed on `id`.
    pub fn remove_event_filter(&mut self, id: WidgetId, filter: FilterId) -> bool {
        self.nodes
            .get_mut(id)
            .is_some_and(|node| node.filters.remove(filter))
    }

    pub fn event_filter_count(&self, id: WidgetId) -> usize {
        self.nodes.get(id).map_or(0, |node| node.filters.len())
    }
}
