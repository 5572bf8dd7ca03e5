use crate::config::BracketConfig;
use crate::data::{BracketError, Round};
use crate::nav::{Chip, Dot, Navigator};
use crate::pager::{DragEffect, Pager, Point, TrackStyle};
use crate::render::{render_slides, RenderOptions, SlideView};
use crate::storage::SnapshotStore;
use crate::store::TournamentStore;
use log::debug;

/// Owns the working rounds, the cursor and the pager. Every mutator leaves the
/// three consistent before it returns.
#[derive(Debug)]
pub struct Bracket<S: SnapshotStore> {
    store: TournamentStore<S>,
    nav: Navigator,
    pager: Pager,
    options: RenderOptions,
    revision: u64,
}

impl<S: SnapshotStore> Bracket<S> {
    pub fn new(storage: S, config: &BracketConfig) -> Self {
        let store = TournamentStore::load(storage, config.auto_seed);
        let nav = Navigator::new(store.round_count());
        Self {
            store,
            nav,
            pager: Pager::new(),
            options: RenderOptions {
                keep_empty_slots: config.keep_empty_slots,
            },
            revision: 0,
        }
    }

    pub fn rounds(&self) -> &[Round] {
        self.store.rounds()
    }

    pub fn snapshot(&self) -> Vec<Round> {
        self.store.snapshot()
    }

    pub fn current(&self) -> usize {
        self.nav.current()
    }

    /// Bumped on every data change; slides rendered for an older revision are stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn slides(&self) -> Vec<SlideView> {
        render_slides(self.store.rounds(), &self.options)
    }

    pub fn chips(&self) -> Vec<Chip> {
        self.nav.chips(self.store.rounds())
    }

    pub fn dots(&self) -> Vec<Dot> {
        self.nav.dots()
    }

    pub fn track_style(&self) -> TrackStyle {
        self.pager.track()
    }

    pub fn viewport_height(&self) -> f64 {
        self.pager.height()
    }

    pub fn go_to(&mut self, target: i64) -> usize {
        let index = self.nav.go_to(target);
        self.pager.settle(index, true);
        debug!("Bracket cursor at round {}", index);
        index
    }

    pub fn replace_state(&mut self, rounds: Vec<Round>) -> Result<(), BracketError> {
        self.store.replace_state(rounds)?;
        self.rebuild();
        Ok(())
    }

    pub fn replace_from_json(&mut self, raw: &str) -> Result<(), BracketError> {
        self.store.replace_from_json(raw)?;
        self.rebuild();
        Ok(())
    }

    pub fn reset_to_default(&mut self) {
        self.store.reset_to_default();
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.revision += 1;
        self.pager.abandon();
        self.nav.set_round_count(self.store.round_count());
        self.pager.settle(self.nav.current(), false);
        debug!(
            "Bracket rebuilt: {} rounds, revision {}",
            self.store.round_count(),
            self.revision
        );
    }

    pub fn press(&mut self, point: Point, now: f64) {
        self.pager.press(point, now);
    }

    pub fn drag(&mut self, point: Point, now: f64) -> DragEffect {
        self.pager.drag(point, now, self.nav.current())
    }

    /// Settles a gesture through `go_to`; `None` when nothing was being dragged.
    pub fn release(&mut self, now: f64) -> Option<usize> {
        let decision = self.pager.release(now)?;
        Some(self.go_to(decision.target(self.nav.current())))
    }

    pub fn resize(&mut self, width: f64) {
        self.pager.resize(width, self.nav.current());
    }

    pub fn fit_height(&mut self, measured: Option<f64>) -> f64 {
        self.pager.fit_height(measured)
    }

    pub fn storage(&self) -> &S {
        self.store.storage()
    }
}
