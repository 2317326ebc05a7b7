//! Chart specs and drawing-surface lifecycle.
//!
//! A [`ChartSlot`] owns at most one live surface. Any change to the spec disposes the old
//! surface before a new one is created, and teardown (explicit or on drop) disposes it too.

pub mod report;
pub mod svg;
pub mod text;

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub data: ChartData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Bars(Vec<Bar>),
    Points(Vec<Point>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Scatter,
}

impl ChartSpec {
    pub fn kind(&self) -> ChartKind {
        match self.data {
            ChartData::Bars(_) => ChartKind::Bar,
            ChartData::Points(_) => ChartKind::Scatter,
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.data {
            ChartData::Bars(bars) => bars.is_empty(),
            ChartData::Points(points) => points.is_empty(),
        }
    }
}

/// A drawing context bound to one chart identity.
pub trait Surface {
    fn draw(&mut self, spec: &ChartSpec) -> anyhow::Result<()>;

    /// Releases whatever the surface holds. Called exactly once per surface.
    fn dispose(&mut self);
}

pub trait SurfaceFactory {
    type Surface: Surface;

    fn create(&self, chart_id: &str) -> anyhow::Result<Self::Surface>;
}

pub struct ChartSlot<F: SurfaceFactory> {
    id: String,
    factory: F,
    current: Option<Mounted<F::Surface>>,
}

struct Mounted<S> {
    spec: ChartSpec,
    surface: S,
}

impl<F: SurfaceFactory> ChartSlot<F> {
    pub fn new(id: impl Into<String>, factory: F) -> Self {
        Self {
            id: id.into(),
            factory,
            current: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn surface(&self) -> Option<&F::Surface> {
        self.current.as_ref().map(|m| &m.surface)
    }

    pub fn spec(&self) -> Option<&ChartSpec> {
        self.current.as_ref().map(|m| &m.spec)
    }

    /// Returns `true` when a new surface was created.
    pub fn update(&mut self, spec: ChartSpec) -> anyhow::Result<bool> {
        if self.current.as_ref().is_some_and(|m| m.spec == spec) {
            return Ok(false);
        }

        self.teardown();

        let mut surface = self.factory.create(&self.id)?;
        if let Err(err) = surface.draw(&spec) {
            surface.dispose();
            return Err(err);
        }
        self.current = Some(Mounted { spec, surface });
        Ok(true)
    }

    pub fn teardown(&mut self) {
        if let Some(mut mounted) = self.current.take() {
            mounted.surface.dispose();
            tracing::debug!(chart_id = %self.id, "chart surface disposed");
        }
    }
}

impl<F: SurfaceFactory> Drop for ChartSlot<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Keyed set of chart slots sharing one surface factory.
pub struct ChartBoard<F: SurfaceFactory + Clone> {
    factory: F,
    slots: BTreeMap<String, ChartSlot<F>>,
}

impl<F: SurfaceFactory + Clone> ChartBoard<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            slots: BTreeMap::new(),
        }
    }

    pub fn mount(&mut self, chart_id: &str, spec: ChartSpec) -> anyhow::Result<bool> {
        let factory = &self.factory;
        self.slots
            .entry(chart_id.to_string())
            .or_insert_with(|| ChartSlot::new(chart_id, factory.clone()))
            .update(spec)
    }

    pub fn unmount(&mut self, chart_id: &str) -> bool {
        self.slots.remove(chart_id).is_some()
    }

    pub fn unmount_all(&mut self) {
        self.slots.clear();
    }

    /// Unmounts every chart whose id is not in `keep`.
    pub fn retain(&mut self, keep: &[&str]) {
        self.slots.retain(|id, _| keep.contains(&id.as_str()));
    }

    pub fn surface(&self, chart_id: &str) -> Option<&F::Surface> {
        self.slots.get(chart_id).and_then(|slot| slot.surface())
    }

    pub fn chart_ids(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    pub struct Counters {
        pub live: AtomicUsize,
        pub peak: AtomicUsize,
        pub created: AtomicUsize,
        pub disposed: AtomicUsize,
    }

    #[derive(Debug, Clone, Default)]
    pub struct CountingFactory {
        pub counters: Arc<Counters>,
        pub fail_draw: bool,
    }

    pub struct CountingSurface {
        counters: Arc<Counters>,
        fail_draw: bool,
        disposed: bool,
    }

    impl SurfaceFactory for CountingFactory {
        type Surface = CountingSurface;

        fn create(&self, _chart_id: &str) -> anyhow::Result<CountingSurface> {
            let live = self.counters.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.counters.peak.fetch_max(live, Ordering::SeqCst);
            self.counters.created.fetch_add(1, Ordering::SeqCst);
            Ok(CountingSurface {
                counters: self.counters.clone(),
                fail_draw: self.fail_draw,
                disposed: false,
            })
        }
    }

    impl Surface for CountingSurface {
        fn draw(&mut self, _spec: &ChartSpec) -> anyhow::Result<()> {
            anyhow::ensure!(!self.fail_draw, "draw failed");
            Ok(())
        }

        fn dispose(&mut self) {
            assert!(!self.disposed, "surface disposed twice");
            self.disposed = true;
            self.counters.live.fetch_sub(1, Ordering::SeqCst);
            self.counters.disposed.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn bars(values: &[f64]) -> ChartSpec {
        ChartSpec {
            title: "test".to_string(),
            x_label: None,
            y_label: None,
            data: ChartData::Bars(
                values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| Bar {
                        label: format!("B{i}"),
                        value: *v,
                    })
                    .collect(),
            ),
        }
    }
}
