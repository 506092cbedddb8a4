#![forbid(unsafe_code)]

//! `wasm-bindgen` exports.
//!
//! State shared with browser callbacks lives in `Rc<RefCell<Shared>>`.
//! Callbacks hold only `Weak` handles and use `try_borrow*`, so a callback
//! arriving after `destroy()` (or while another callback runs) is dropped
//! instead of panicking.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};
use std::time::Duration;

use js_sys::{Array, Object, Reflect};
use rcq_core::{
    ContainerQueries, ReconcileReport, resolve, responsive_container_breakpoints,
    update_container_classes,
};
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, ResizeObserver, ResizeObserverEntry, Window};

use crate::console::{init_logging, install_panic_hook};
use crate::dom::{DomContainer, ResizeObserverBridge, discover};
use crate::options::parse_web_options;

struct StoreSubscription {
    unsubscribe: js_sys::Function,
    listener: Closure<dyn FnMut()>,
}

struct Shared {
    queries: ContainerQueries<DomContainer, ResizeObserverBridge>,
    window: Window,
    document: Document,
    selector: String,
    timer_armed: bool,
    stores: Vec<StoreSubscription>,
}

impl Shared {
    fn reconcile_now(&mut self) -> ReconcileReport<DomContainer> {
        let discovered = discover(&self.document, &self.selector);
        self.queries.reconcile(discovered)
    }

    fn detach_stores(&mut self) {
        for StoreSubscription {
            unsubscribe,
            listener,
        } in self.stores.drain(..)
        {
            if let Err(err) = unsubscribe.call0(&JsValue::NULL) {
                // The host may still call the listener; it must outlive us.
                tracing::warn!(error = ?err, "store unsubscribe threw");
                listener.forget();
            }
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.detach_stores();
    }
}

/// Container-query runtime bound to the current document.
///
/// ```js
/// const rc = new ResponsiveContainers({ policy: "layered", logLevel: "debug" });
/// rc.start();                                  // reconcile on DOMContentLoaded
/// rc.attachStore(wp.data.subscribe);           // debounced reconcile on changes
/// ```
#[wasm_bindgen]
pub struct ResponsiveContainers {
    shared: Rc<RefCell<Shared>>,
}

#[wasm_bindgen]
impl ResponsiveContainers {
    /// Create an instance from an optional options object. Throws on invalid
    /// options or when there is no `window`/`document`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<JsValue>) -> Result<ResponsiveContainers, JsValue> {
        install_panic_hook();
        let json = options_json(options.as_ref())?;
        let options =
            parse_web_options(json.as_deref()).map_err(|e| JsValue::from_str(&e.to_string()))?;
        init_logging(options.log_level);

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        let selector = options.config.selector();
        let config = options.config;

        let shared = Rc::new_cyclic(|weak: &Weak<RefCell<Shared>>| {
            let weak = weak.clone();
            let callback = Closure::wrap(Box::new(move |entries: Array, _observer: ResizeObserver| {
                on_resize(&weak, &entries);
            }) as Box<dyn FnMut(Array, ResizeObserver)>);
            RefCell::new(Shared {
                queries: ContainerQueries::new(config, ResizeObserverBridge::new(callback)),
                window,
                document,
                selector,
                timer_armed: false,
                stores: Vec::new(),
            })
        });

        Ok(Self { shared })
    }

    /// Reconcile once the document is parsed (immediately if it already is).
    pub fn start(&self) -> Result<(), JsValue> {
        let loading = {
            let state = self.state()?;
            let ready_state = Reflect::get(&state.document, &JsValue::from_str("readyState"))?;
            ready_state.as_string().as_deref() == Some("loading")
        };

        if loading {
            let weak = Rc::downgrade(&self.shared);
            let on_ready = Closure::once_into_js(move || {
                if let Some(shared) = weak.upgrade() {
                    run_ready(&shared);
                }
            });
            self.state()?
                .document
                .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
        } else {
            run_ready(&self.shared);
        }
        Ok(())
    }

    /// Reconcile now. Returns `{ added, removed, retained }`.
    pub fn update(&self) -> Result<JsValue, JsValue> {
        let mut state = self.state_mut()?;
        let report = state.reconcile_now();
        Ok(report_to_js(&report))
    }

    /// Request a debounced reconcile.
    #[wasm_bindgen(js_name = notifyChange)]
    pub fn notify_change(&self) {
        notify(&self.shared);
    }

    /// Subscribe to a host store: `subscribe(listener)` is called once and may
    /// return an unsubscribe function, which `destroy()` calls. Without one the
    /// listener stays registered and does nothing once the instance is gone.
    #[wasm_bindgen(js_name = attachStore)]
    pub fn attach_store(&self, subscribe: js_sys::Function) -> Result<(), JsValue> {
        let weak = Rc::downgrade(&self.shared);
        let listener = Closure::wrap(Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                notify(&shared);
            }
        }) as Box<dyn FnMut()>);

        let returned = subscribe.call1(&JsValue::NULL, listener.as_ref().unchecked_ref())?;
        let Ok(unsubscribe) = returned.dyn_into::<js_sys::Function>() else {
            // No way to detach: the host keeps calling the listener, which
            // turns into a no-op once this instance is gone.
            tracing::debug!("store subscribe returned no unsubscribe function");
            listener.forget();
            return Ok(());
        };
        match self.state_mut() {
            Ok(mut state) => {
                state.stores.push(StoreSubscription {
                    unsubscribe,
                    listener,
                });
                Ok(())
            }
            Err(err) => {
                let _ = unsubscribe.call0(&JsValue::NULL);
                listener.forget();
                Err(err)
            }
        }
    }

    /// Classify `element` now, measuring it when `width` is omitted.
    /// Returns the active class names.
    #[wasm_bindgen(js_name = updateClasses)]
    pub fn update_classes(&self, element: Element, width: Option<f64>) -> Result<Array, JsValue> {
        let state = self.state()?;
        let update = update_container_classes(
            &DomContainer::new(element),
            width,
            state.queries.config(),
        );
        Ok(update.active.iter().map(|name| JsValue::from_str(name)).collect())
    }

    /// Resolved breakpoints for `element` (or the defaults) as
    /// `Array<{ name, size }>`, sorted by size.
    #[wasm_bindgen(js_name = getBreakpoints)]
    pub fn get_breakpoints(&self, element: Option<Element>) -> Result<Array, JsValue> {
        let state = self.state()?;
        let container = element.map(DomContainer::new);
        let set = resolve(container.as_ref(), state.queries.config());
        Ok(set
            .iter()
            .map(|bp| {
                let obj = Object::new();
                let _ = Reflect::set(&obj, &"name".into(), &JsValue::from_str(&bp.name));
                let _ = Reflect::set(&obj, &"size".into(), &JsValue::from_f64(bp.threshold));
                JsValue::from(obj)
            })
            .collect())
    }

    /// Number of containers currently observed. Throws during a reconcile.
    #[wasm_bindgen(js_name = trackedCount)]
    pub fn tracked_count(&self) -> Result<u32, JsValue> {
        let len = self.state()?.queries.registry().len();
        Ok(u32::try_from(len).unwrap_or(u32::MAX))
    }

    /// Whether size changes are reported (false without `ResizeObserver`).
    #[wasm_bindgen(js_name = isObserving)]
    pub fn is_observing(&self) -> Result<bool, JsValue> {
        Ok(self.state()?.queries.observer().is_connected())
    }

    /// Unobserve everything and detach from host stores.
    pub fn destroy(&self) -> Result<(), JsValue> {
        let mut state = self.state_mut()?;
        state.detach_stores();
        state.queries.shutdown();
        Ok(())
    }
}

impl ResponsiveContainers {
    fn state(&self) -> Result<Ref<'_, Shared>, JsValue> {
        self.shared
            .try_borrow()
            .map_err(|_| JsValue::from_str("responsive containers busy: reconcile in progress"))
    }

    fn state_mut(&self) -> Result<RefMut<'_, Shared>, JsValue> {
        self.shared
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("responsive containers busy: reconcile in progress"))
    }
}

thread_local! {
    static DEFAULT: RefCell<Option<ResponsiveContainers>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn wasm_start() -> Result<(), JsValue> {
    install_panic_hook();
    install_default(None)
}

/// Build and start a replacement before retiring the running instance, so a
/// rejected configuration leaves the old one in place.
fn install_default(options: Option<JsValue>) -> Result<(), JsValue> {
    let instance = ResponsiveContainers::new(options)?;
    instance.start()?;
    let swapped = DEFAULT.with(|slot| match slot.try_borrow_mut() {
        Ok(mut slot) => Ok(slot.replace(instance)),
        Err(_) => Err(instance),
    });
    match swapped {
        Ok(Some(previous)) => previous.destroy(),
        Ok(None) => Ok(()),
        Err(rejected) => {
            rejected.destroy()?;
            Err(JsValue::from_str(
                "cannot reconfigure from inside a default-instance call",
            ))
        }
    }
}

fn with_default<T>(
    f: impl FnOnce(&ResponsiveContainers) -> Result<T, JsValue>,
) -> Result<T, JsValue> {
    DEFAULT.with(|slot| {
        let slot = slot
            .try_borrow()
            .map_err(|_| JsValue::from_str("default instance is being replaced"))?;
        match slot.as_ref() {
            Some(instance) => f(instance),
            None => Err(JsValue::from_str("responsive containers are not running")),
        }
    })
}

/// Re-run discovery on the default instance, e.g. after injecting markup.
#[wasm_bindgen(js_name = updateResponsiveContainers)]
pub fn update_responsive_containers() -> Result<JsValue, JsValue> {
    with_default(ResponsiveContainers::update)
}

/// Debounced variant of `updateResponsiveContainers`; safe to call in bursts.
#[wasm_bindgen(js_name = notifyResponsiveContainers)]
pub fn notify_responsive_containers() -> Result<(), JsValue> {
    with_default(|instance| {
        instance.notify_change();
        Ok(())
    })
}

/// Replace the default instance with one built from `options`.
#[wasm_bindgen(js_name = configureResponsiveContainers)]
pub fn configure_responsive_containers(options: Option<JsValue>) -> Result<(), JsValue> {
    install_default(options)
}

/// Serialize `{ className: minWidth }` as attribute-escaped JSON, dropping
/// non-numeric values.
#[wasm_bindgen(js_name = responsiveContainerBreakpoints)]
pub fn responsive_container_breakpoints_js(mapping: JsValue) -> Result<String, JsValue> {
    let json = js_sys::JSON::stringify(&mapping)?
        .as_string()
        .ok_or_else(|| JsValue::from_str("breakpoints must be an object"))?;
    match serde_json::from_str::<Value>(&json) {
        Ok(Value::Object(object)) => Ok(responsive_container_breakpoints(&object)),
        _ => Err(JsValue::from_str("breakpoints must be an object")),
    }
}

fn options_json(options: Option<&JsValue>) -> Result<Option<String>, JsValue> {
    let Some(options) = options.filter(|o| !o.is_null() && !o.is_undefined()) else {
        return Ok(None);
    };
    Ok(js_sys::JSON::stringify(options)?.as_string())
}

fn run_ready(shared: &Rc<RefCell<Shared>>) {
    let Ok(mut state) = shared.try_borrow_mut() else {
        tracing::warn!("page-ready reconcile skipped: runtime busy");
        return;
    };
    let discovered = discover(&state.document, &state.selector);
    state.queries.on_ready(discovered);
}

fn on_resize(weak: &Weak<RefCell<Shared>>, entries: &Array) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let Ok(state) = shared.try_borrow() else {
        tracing::debug!("resize batch dropped: runtime busy");
        return;
    };
    for entry in entries.iter() {
        let entry: ResizeObserverEntry = entry.unchecked_into();
        let width = entry.content_rect().width();
        state
            .queries
            .on_resize(&DomContainer::new(entry.target()), width);
    }
}

fn notify(shared: &Rc<RefCell<Shared>>) {
    let Ok(mut state) = shared.try_borrow_mut() else {
        tracing::debug!("change notification dropped: runtime busy");
        return;
    };
    let now = host_now(&state.window);
    state.queries.notify_change_at(now);
    if !state.timer_armed
        && let Some(wait) = state.queries.time_until_reconcile(now)
    {
        arm_timer(shared, &mut state, wait);
    }
}

fn arm_timer(shared: &Rc<RefCell<Shared>>, state: &mut Shared, wait: Duration) {
    let weak = Rc::downgrade(shared);
    let callback = Closure::once_into_js(move || on_timer(&weak));
    // Round up so the timer never lands just short of the window.
    let timeout = i32::try_from(wait.as_micros().div_ceil(1000)).unwrap_or(i32::MAX);
    match state
        .window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), timeout)
    {
        Ok(_) => state.timer_armed = true,
        Err(err) => tracing::warn!(error = ?err, "setTimeout failed; reconcile deferred"),
    }
}

fn on_timer(weak: &Weak<RefCell<Shared>>) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let Ok(mut guard) = shared.try_borrow_mut() else {
        tracing::warn!("debounced reconcile skipped: runtime busy");
        return;
    };
    let state = &mut *guard;
    state.timer_armed = false;

    let now = host_now(&state.window);
    let (document, selector) = (&state.document, state.selector.as_str());
    state.queries.poll_at(now, || discover(document, selector));

    if let Some(wait) = state.queries.time_until_reconcile(now) {
        arm_timer(&shared, state, wait);
    }
}

fn host_now(window: &Window) -> Duration {
    let ms = window
        .performance()
        .map_or_else(js_sys::Date::now, |performance| performance.now());
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

fn report_to_js(report: &ReconcileReport<DomContainer>) -> JsValue {
    let obj = Object::new();
    let added = u32::try_from(report.added.len()).unwrap_or(u32::MAX);
    let removed = u32::try_from(report.removed).unwrap_or(u32::MAX);
    let retained = u32::try_from(report.retained).unwrap_or(u32::MAX);
    let _ = Reflect::set(&obj, &"added".into(), &added.into());
    let _ = Reflect::set(&obj, &"removed".into(), &removed.into());
    let _ = Reflect::set(&obj, &"retained".into(), &retained.into());
    obj.into()
}
