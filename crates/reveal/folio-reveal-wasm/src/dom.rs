//! DOM mount for the portfolio page.
//!
//! Scans the markup once with the page's selectors, builds the registry,
//! then wires IntersectionObservers (one per group kind/threshold), a
//! requestAnimationFrame loop that steps the engine, and scroll/unload
//! listeners. Every listener lives for the page lifetime.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use hashbrown::HashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, NodeList, Window,
};

use folio_reveal_core::{
    parallax_transform, ticker_duration, ChangeOp, ChartPart, GroupId, GroupKind, GroupSpec,
    Inputs, Intersection, LoopKind, Outputs, RegistryBuilder, RevealEngine, RevealEvent,
    RevealKind, ScrollDepth,
};

use crate::{config_from_js, dt_from_js};

/// Attribute carrying the GroupId on observed targets.
const GROUP_ATTR: &str = "data-folio-group";

fn js_err(e: JsValue) -> anyhow::Error {
    anyhow!("{:?}", e)
}

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect()
}

fn doc_all(doc: &Document, selector: &str) -> Result<Vec<Element>> {
    doc.query_selector_all(selector)
        .map(elements)
        .map_err(js_err)
        .with_context(|| format!("querySelectorAll({selector})"))
}

fn el_all(root: &Element, selector: &str) -> Result<Vec<Element>> {
    root.query_selector_all(selector)
        .map(elements)
        .map_err(js_err)
        .with_context(|| format!("querySelectorAll({selector})"))
}

type Targets = HashMap<GroupId, (Element, GroupKind)>;
type Observers = HashMap<GroupKind, IntersectionObserver>;

/// Registry under construction plus the element handles behind each key.
#[derive(Default)]
struct Scan {
    builder: RegistryBuilder,
    elements: HashMap<String, HtmlElement>,
    targets: Targets,
    next_key: u32,
}

impl Scan {
    fn key_for(&mut self, el: &Element) -> Option<String> {
        let html = el.clone().dyn_into::<HtmlElement>().ok()?;
        let key = format!("folio-{}", self.next_key);
        self.next_key += 1;
        self.elements.insert(key.clone(), html);
        Some(key)
    }

    fn observed_group(&mut self, target: &Element, kind: GroupKind) -> GroupId {
        let g = self.builder.group(GroupSpec::new(kind));
        if let Err(e) = target.set_attribute(GROUP_ATTR, &g.0.to_string()) {
            log::debug!("could not tag group target: {:?}", e);
        }
        self.targets.insert(g, (target.clone(), kind));
        g
    }

    fn add(&mut self, group: GroupId, el: &Element, kind: RevealKind) -> Result<()> {
        if let Some(key) = self.key_for(el) {
            self.builder.member(group, key, kind)?;
        }
        Ok(())
    }

    fn add_at(&mut self, group: GroupId, el: &Element, kind: RevealKind, index: usize) -> Result<()> {
        if let Some(key) = self.key_for(el) {
            self.builder.member_at(group, key, kind, index)?;
        }
        Ok(())
    }

    fn commands(&mut self, doc: &Document) -> Result<()> {
        let lines = doc_all(doc, ".command-line:not(.active) .command")?;
        if lines.is_empty() {
            return Ok(());
        }
        let g = self.builder.group(GroupSpec::new(GroupKind::Commands));
        for el in &lines {
            let text = el.text_content().unwrap_or_default();
            self.add(g, el, RevealKind::TypedText { text })?;
        }
        Ok(())
    }

    fn metrics(&mut self, doc: &Document) -> Result<()> {
        for container in doc_all(doc, ".metrics-ticker")? {
            let g = self.observed_group(&container, GroupKind::Metrics);
            for el in el_all(&container, ".metric-value[data-target]")? {
                let kind = RevealKind::TickerMetric {
                    target: el.get_attribute("data-target").unwrap_or_default(),
                    original_text: el.text_content().unwrap_or_default(),
                };
                self.add(g, &el, kind)?;
            }
        }
        for container in doc_all(doc, ".metrics-terminal")? {
            let g = self.observed_group(&container, GroupKind::Metrics);
            for el in el_all(&container, ".metric-value[data-target]")? {
                let kind = RevealKind::Counter {
                    target: el.get_attribute("data-target").unwrap_or_default(),
                    prefix: el.get_attribute("data-prefix").unwrap_or_default(),
                    suffix: el.get_attribute("data-suffix").unwrap_or_default(),
                };
                self.add(g, &el, kind)?;
            }
        }
        for container in doc_all(doc, ".project-metrics")? {
            let g = self.observed_group(&container, GroupKind::Metrics);
            for el in el_all(&container, ".metrics-grid .metric-box-value")? {
                let text = el.text_content().unwrap_or_default();
                self.add(g, &el, RevealKind::TypedText { text })?;
            }
        }
        Ok(())
    }

    fn cards(&mut self, doc: &Document) -> Result<()> {
        let mut parent: Option<Element> = None;
        let mut index = 0usize;
        for (n, card) in doc_all(doc, ".achievement-card, .project-card, .experience-item")?
            .into_iter()
            .enumerate()
        {
            let p = card.parent_element();
            if n > 0 && p == parent {
                index += 1;
            } else {
                index = 0;
                parent = p;
            }
            let g = self.observed_group(&card, GroupKind::Fade);
            self.add_at(g, &card, RevealKind::FadeCard, index)?;
        }
        Ok(())
    }

    fn charts(&mut self, doc: &Document) -> Result<()> {
        for container in doc_all(doc, ".project-visualization")? {
            let g = self.observed_group(&container, GroupKind::Chart);
            for line in el_all(&container, ".strategy-chart .strategy-line")? {
                let part = ChartPart::StrategyLine;
                self.add(g, &line, RevealKind::ChartNode { part })?;
            }
            for visual in el_all(&container, ".algo-visual")? {
                for (i, node) in el_all(&visual, ".node")?.iter().enumerate() {
                    let part = ChartPart::AlgoNode;
                    self.add_at(g, node, RevealKind::ChartNode { part }, i)?;
                }
            }
            for visual in el_all(&container, ".code-visual")? {
                for (i, line) in el_all(&visual, ".code-line")?.iter().enumerate() {
                    let part = ChartPart::CodeLine;
                    self.add_at(g, line, RevealKind::ChartNode { part }, i)?;
                }
            }
        }
        Ok(())
    }

    fn lazy_images(&mut self, doc: &Document) -> Result<()> {
        for img in doc_all(doc, "img[data-src]")? {
            let src = img.get_attribute("data-src").unwrap_or_default();
            let g = self.observed_group(&img, GroupKind::LazyImage);
            self.add(g, &img, RevealKind::LazyImage { src })?;
        }
        Ok(())
    }
}

fn scan_document(doc: &Document) -> Result<Scan> {
    let mut scan = Scan::default();
    scan.commands(doc)?;
    scan.metrics(doc)?;
    scan.cards(doc)?;
    scan.charts(doc)?;
    scan.lazy_images(doc)?;
    Ok(scan)
}

struct PageState {
    engine: RevealEngine,
    elements: HashMap<String, HtmlElement>,
    targets: Targets,
    observers: Observers,
    pending: Vec<Intersection>,
    last_frame_ms: Option<f64>,
    carry_ms: f64,
}

impl PageState {
    fn frame(&mut self, timestamp: f64) {
        let dt = match self.last_frame_ms {
            Some(prev) => timestamp - prev + self.carry_ms,
            None => 0.0,
        };
        self.last_frame_ms = Some(timestamp);
        let whole = dt_from_js(dt);
        self.carry_ms = (dt - whole as f64).max(0.0);

        let PageState {
            engine,
            elements,
            targets,
            observers,
            pending,
            ..
        } = self;
        let inputs = Inputs {
            intersections: std::mem::take(pending),
        };
        let out = engine.update(whole, inputs);
        apply_outputs(out, elements, targets, observers);
    }
}

fn apply_op(el: &HtmlElement, op: &ChangeOp) -> std::result::Result<(), JsValue> {
    match op {
        ChangeOp::SetText { text } => el.set_text_content(Some(text)),
        ChangeOp::SetStyle { property, value } => el.style().set_property(property, value)?,
        ChangeOp::SetAttribute { name, value } => el.set_attribute(name, value)?,
        ChangeOp::AddClass { class } => el.class_list().add_1(class)?,
    }
    Ok(())
}

fn apply_outputs(
    out: &Outputs,
    elements: &HashMap<String, HtmlElement>,
    targets: &Targets,
    observers: &Observers,
) {
    for change in &out.changes {
        // Detached or unknown elements are skipped.
        let Some(el) = elements.get(&change.key) else {
            continue;
        };
        if let Err(e) = apply_op(el, &change.op) {
            log::debug!("write to '{}' failed: {:?}", change.key, e);
        }
    }
    for event in &out.events {
        if let RevealEvent::Unobserve { group } = event {
            if let Some((target, kind)) = targets.get(group) {
                if let Some(observer) = observers.get(kind) {
                    observer.unobserve(target);
                }
            }
        }
    }
}

fn observe_groups(state: &Rc<RefCell<PageState>>) {
    let mut kinds: Vec<GroupKind> = Vec::new();
    for (_, kind) in state.borrow().targets.values() {
        if !kinds.contains(kind) {
            kinds.push(*kind);
        }
    }

    for kind in kinds {
        let threshold = state.borrow().engine.threshold(kind);
        let sink = state.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            let Ok(mut s) = sink.try_borrow_mut() else {
                return;
            };
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let group = entry
                    .target()
                    .get_attribute(GROUP_ATTR)
                    .and_then(|v| v.parse::<u32>().ok());
                if let Some(group) = group {
                    s.pending.push(Intersection {
                        group: GroupId(group),
                        ratio: entry.intersection_ratio() as f32,
                        is_intersecting: entry.is_intersecting(),
                    });
                }
            }
        });

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(f64::from(threshold)));
        let observer =
            match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
            {
                Ok(o) => o,
                Err(e) => {
                    // No observer support: these reveals are skipped and the markup stays as authored.
                    log::warn!("IntersectionObserver unavailable for {:?}: {:?}", kind, e);
                    continue;
                }
            };
        callback.forget();

        let mut s = state.borrow_mut();
        for (target, k) in s.targets.values() {
            if *k == kind {
                observer.observe(target);
            }
        }
        s.observers.insert(kind, observer);
    }
}

fn start_frames(state: Rc<RefCell<PageState>>, window: &Window) -> Result<()> {
    let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
        if let Ok(mut s) = state.try_borrow_mut() {
            s.frame(timestamp);
        }
        if let (Some(w), Some(cb)) = (web_sys::window(), f.borrow().as_ref()) {
            if let Err(e) = w.request_animation_frame(cb.as_ref().unchecked_ref()) {
                log::debug!("requestAnimationFrame failed: {:?}", e);
            }
        }
    }));

    let first = g.borrow();
    let cb = first
        .as_ref()
        .ok_or_else(|| anyhow!("frame callback missing"))?;
    window
        .request_animation_frame(cb.as_ref().unchecked_ref())
        .map_err(js_err)
        .context("requestAnimationFrame")?;
    Ok(())
}

fn size_ticker(doc: &Document) -> Result<()> {
    let Some(ticker) = doc.query_selector(".terminal-ticker").map_err(js_err)? else {
        return Ok(());
    };
    let content = ticker
        .query_selector(".ticker-content")
        .map_err(js_err)?
        .and_then(|c| c.dyn_into::<HtmlElement>().ok());
    let (Some(content), Ok(ticker)) = (content, ticker.dyn_into::<HtmlElement>()) else {
        return Ok(());
    };
    if let Some(secs) = ticker_duration(
        f64::from(content.offset_width()),
        f64::from(ticker.offset_width()),
    ) {
        content
            .style()
            .set_property("animation-duration", &format!("{secs}s"))
            .map_err(js_err)?;
    }
    Ok(())
}

fn listen_scroll(window: &Window, doc: &Document) -> Result<()> {
    let hero = doc
        .query_selector(".hero")
        .map_err(js_err)?
        .and_then(|e| e.dyn_into::<HtmlElement>().ok());
    let depth = Rc::new(RefCell::new(ScrollDepth::new()));

    let writer = depth.clone();
    let on_scroll = Closure::<dyn FnMut()>::new(move || {
        let Some(w) = web_sys::window() else {
            return;
        };
        let y = w.scroll_y().unwrap_or(0.0);
        if let Some(hero) = &hero {
            if let Err(e) = hero.style().set_property("transform", &parallax_transform(y)) {
                log::debug!("hero parallax write failed: {:?}", e);
            }
        }
        let viewport_h = w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let document_h = w
            .document()
            .and_then(|d| d.document_element())
            .map(|e| f64::from(e.scroll_height()))
            .unwrap_or(0.0);
        writer.borrow_mut().record(y, viewport_h, document_h);
    });
    window
        .add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())
        .map_err(js_err)?;
    on_scroll.forget();

    let on_unload = Closure::<dyn FnMut()>::new(move || {
        log::info!("max scroll depth: {}%", depth.borrow().max_percent());
    });
    window
        .add_event_listener_with_callback("beforeunload", on_unload.as_ref().unchecked_ref())
        .map_err(js_err)?;
    on_unload.forget();
    Ok(())
}

fn mount(config: JsValue) -> std::result::Result<u32, JsError> {
    let cfg = config_from_js(config)?;
    mount_with(cfg).map_err(|e| JsError::new(&format!("mount error: {e:#}")))
}

fn mount_with(cfg: folio_reveal_core::RevealConfig) -> Result<u32> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
    let doc = window.document().ok_or_else(|| anyhow!("no document"))?;

    let mut scan = scan_document(&doc)?;

    let mut loop_keys = Vec::new();
    for cursor in doc_all(&doc, ".cursor")? {
        if let Some(key) = scan.key_for(&cursor) {
            loop_keys.push((key, LoopKind::CursorBlink));
        }
    }
    if let Some(badge) = doc.query_selector(".hero-badge").map_err(js_err)? {
        if let Some(key) = scan.key_for(&badge) {
            loop_keys.push((key, LoopKind::HueCycle));
        }
    }

    let Scan {
        builder,
        elements,
        targets,
        ..
    } = scan;
    let mut engine = RevealEngine::new(cfg, builder.build())?;
    for (key, kind) in loop_keys {
        engine.start_loop(key, kind);
    }
    let groups = engine.registry().len() as u32;
    log::debug!("mounted {groups} reveal group(s)");

    let state = Rc::new(RefCell::new(PageState {
        engine,
        elements,
        targets,
        observers: HashMap::new(),
        pending: Vec::new(),
        last_frame_ms: None,
        carry_ms: 0.0,
    }));

    observe_groups(&state);
    start_frames(state, &window)?;
    size_ticker(&doc)?;
    listen_scroll(&window, &doc)?;
    Ok(groups)
}

/// Scan the current document and start every page effect. Pass a config
/// object or undefined/null for defaults. Returns the number of groups found.
#[wasm_bindgen(js_name = mount_page)]
pub fn mount_page(config: JsValue) -> std::result::Result<u32, JsError> {
    console_error_panic_hook::set_once();
    crate::console::init();
    mount(config)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const FRAGMENT: &str = r#"
        <div class="metrics-ticker">
          <span class="metric-value" data-target="500000">500,000+</span>
        </div>
        <div class="metrics-terminal">
          <span class="metric-value" data-target="2700" data-suffix="+">0</span>
        </div>
        <section class="achievements">
          <div class="achievement-card">a0</div>
          <div class="achievement-card">a1</div>
        </section>
        <section class="projects">
          <div class="project-card">p0</div>
          <div class="project-card">p1</div>
          <div class="project-card">p2</div>
        </section>
        <div class="project-visualization">
          <div class="strategy-chart"><div class="strategy-line"></div></div>
          <div class="algo-visual"><div class="node"></div><div class="node"></div></div>
          <div class="code-visual"><div class="code-line">x</div></div>
        </div>
        <img data-src="shot.png">
    "#;

    fn inject(html: &str) -> (Document, Element) {
        let doc = web_sys::window().unwrap().document().unwrap();
        let host = doc.create_element("div").unwrap();
        host.set_inner_html(html);
        doc.body().unwrap().append_child(&host).unwrap();
        (doc, host)
    }

    #[wasm_bindgen_test]
    fn scan_maps_selectors_to_groups() {
        let (doc, host) = inject(FRAGMENT);
        let Scan {
            builder, targets, ..
        } = scan_document(&doc).unwrap();
        let reg = builder.build();
        // ticker, terminal, five cards, chart, image
        assert_eq!(reg.len(), 9);
        assert_eq!(targets.len(), 9);

        let kinds: Vec<GroupKind> = reg.groups().map(|g| g.spec.kind).collect();
        assert_eq!(kinds[0], GroupKind::Metrics);
        assert_eq!(kinds[1], GroupKind::Metrics);
        assert_eq!(kinds[7], GroupKind::Chart);
        assert_eq!(kinds[8], GroupKind::LazyImage);

        let ticker = &reg.group(GroupId(0)).unwrap().members[0];
        assert!(matches!(
            &ticker.kind,
            RevealKind::TickerMetric { target, original_text }
                if target == "500000" && original_text == "500,000+"
        ));
        let terminal = &reg.group(GroupId(1)).unwrap().members[0];
        assert!(matches!(
            &terminal.kind,
            RevealKind::Counter { suffix, .. } if suffix == "+"
        ));

        for (g, (el, _)) in &targets {
            assert_eq!(el.get_attribute(GROUP_ATTR), Some(g.0.to_string()));
        }
        host.remove();
    }

    #[wasm_bindgen_test]
    fn fade_index_restarts_per_parent() {
        let (doc, host) = inject(FRAGMENT);
        let reg = scan_document(&doc).unwrap().builder.build();
        let fade: Vec<usize> = reg
            .groups()
            .filter(|g| g.spec.kind == GroupKind::Fade)
            .map(|g| g.members[0].index)
            .collect();
        assert_eq!(fade, vec![0, 1, 0, 1, 2]);

        let chart = reg
            .groups()
            .find(|g| g.spec.kind == GroupKind::Chart)
            .unwrap();
        let parts: Vec<(ChartPart, usize)> = chart
            .members
            .iter()
            .filter_map(|m| match m.kind {
                RevealKind::ChartNode { part } => Some((part, m.index)),
                _ => None,
            })
            .collect();
        assert_eq!(
            parts,
            vec![
                (ChartPart::StrategyLine, 0),
                (ChartPart::AlgoNode, 0),
                (ChartPart::AlgoNode, 1),
                (ChartPart::CodeLine, 0),
            ]
        );
        host.remove();
    }

    #[wasm_bindgen_test]
    fn outputs_are_written_to_elements() {
        let (doc, host) = inject(r#"<img id="pic" data-src="shot.png">"#);
        let img = doc
            .get_element_by_id("pic")
            .unwrap()
            .dyn_into::<HtmlElement>()
            .unwrap();
        let mut elements = HashMap::new();
        elements.insert("pic".to_string(), img.clone());

        let noop = Closure::<dyn FnMut(js_sys::Array)>::new(|_: js_sys::Array| {});
        let observer = IntersectionObserver::new(noop.as_ref().unchecked_ref()).unwrap();
        noop.forget();
        observer.observe(&img);
        let mut targets = Targets::new();
        targets.insert(GroupId(0), (img.clone().into(), GroupKind::LazyImage));
        let mut observers = Observers::new();
        observers.insert(GroupKind::LazyImage, observer);

        let mut out = Outputs::default();
        out.push_change(
            "pic",
            ChangeOp::SetAttribute {
                name: "src".into(),
                value: "shot.png".into(),
            },
        );
        out.push_change(
            "pic",
            ChangeOp::AddClass {
                class: "loaded".into(),
            },
        );
        out.push_change("pic", ChangeOp::style("opacity", "1"));
        out.push_change("gone", ChangeOp::text("skipped"));
        out.push_event(RevealEvent::Unobserve { group: GroupId(0) });
        out.push_event(RevealEvent::Unobserve { group: GroupId(9) });

        apply_outputs(&out, &elements, &targets, &observers);

        assert_eq!(img.get_attribute("src").as_deref(), Some("shot.png"));
        assert!(img.class_list().contains("loaded"));
        assert_eq!(img.style().get_property_value("opacity").unwrap(), "1");
        host.remove();
    }
}
