pub mod api;
pub mod bracket;
pub mod config;
pub mod data;
pub mod nav;
pub mod pager;
pub mod render;
pub mod storage;
pub mod store;

use api::SharedBracket;
use bracket::Bracket;
use config::BracketConfig;
use data::BracketError;
use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Timeout;
use log::{debug, warn};
use nav::{Chip, Dot};
use pager::{DragEffect, Point};
use render::{PackView, SlideView, SlotView, TeamCard, EMPTY_SLOT_LABEL};
use storage::BrowserStorage;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement, MouseEvent, TouchEvent};
use yew::prelude::*;

const MOUNT_SELECTOR: &str = "#mecom-bracket";
const RENDER_SETTLE_MS: u32 = 30;
const NAVIGATE_SETTLE_MS: u32 = 120;

#[derive(Properties, PartialEq)]
struct BracketProps {
    config: BracketConfig,
}

#[function_component(BracketApp)]
fn bracket_app(props: &BracketProps) -> Html {
    let config = props.config.clone();
    let bracket: SharedBracket =
        use_mut_ref(move || Bracket::new(BrowserStorage::new(&config.storage_key), &config));
    let refresh = use_force_update();
    let swiper_ref = use_node_ref();
    let track_ref = use_node_ref();
    let revealed = use_state(|| None::<u64>);

    let (revision, current) = {
        let bracket = bracket.borrow();
        (bracket.revision(), bracket.current())
    };

    {
        let bracket = bracket.clone();
        let refresh = refresh.clone();
        let swiper_ref = swiper_ref.clone();
        let track_ref = track_ref.clone();

        use_effect_with_deps(
            move |_| {
                let api_refresh = refresh.clone();
                api::install(
                    bracket.clone(),
                    Callback::from(move |_| api_refresh.force_update()),
                );
                let listeners = attach_gestures(&swiper_ref, &track_ref, bracket, refresh);

                move || {
                    api::uninstall();
                    drop(listeners);
                }
            },
            (),
        );
    }

    {
        let bracket = bracket.clone();
        let refresh = refresh.clone();
        let track_ref = track_ref.clone();
        let revealed = revealed.clone();

        use_effect_with_deps(
            move |revision: &u64| {
                revealed.set(Some(*revision));
                schedule_height_fit(bracket, track_ref, refresh, RENDER_SETTLE_MS);
                || ()
            },
            revision,
        );
    }

    {
        let bracket = bracket.clone();
        let refresh = refresh.clone();
        let track_ref = track_ref.clone();

        use_effect_with_deps(
            move |_| {
                schedule_height_fit(bracket, track_ref, refresh, NAVIGATE_SETTLE_MS);
                || ()
            },
            current,
        );
    }

    let go_to = {
        let bracket = bracket.clone();
        let refresh = refresh.clone();
        Callback::from(move |index: usize| {
            bracket.borrow_mut().go_to(index as i64);
            refresh.force_update();
        })
    };

    let view = bracket.borrow();
    let slides = view.slides();
    let chips = view.chips();
    let dots = view.dots();
    let track_style = view.track_style().to_css();
    let viewport_style = format!("height: {}px;", view.viewport_height());
    drop(view);
    let shown = *revealed == Some(revision);

    html! {
        <>
            <div id="mecomRoundsNav" class="mecom-rounds-nav">
                { for chips.iter().map(|chip| render_chip(chip, &go_to)) }
            </div>
            <div id="mecomSwiper" class="mecom-swiper" ref={swiper_ref} style={viewport_style}>
                <div id="mecomSwiperTrack" class="mecom-swiper-track" ref={track_ref} style={track_style}>
                    { for slides.iter().map(|slide| render_slide(slide, shown)) }
                </div>
            </div>
            <div id="mecomDots" class="mecom-dots">
                { for dots.iter().map(|dot| render_dot(dot, &go_to)) }
            </div>
        </>
    }
}

fn render_chip(chip: &Chip, go_to: &Callback<usize>) -> Html {
    let index = chip.index;
    let onclick = go_to.reform(move |_: MouseEvent| index);

    html! {
        <button key={index} type="button"
            class={classes!("mecom-chip", chip.active.then_some("is-active"))}
            {onclick}>
            { &chip.label }
        </button>
    }
}

fn render_dot(dot: &Dot, go_to: &Callback<usize>) -> Html {
    let index = dot.index;
    let onclick = go_to.reform(move |_: MouseEvent| index);

    html! {
        <div key={index} class={classes!("mecom-dot", dot.active.then_some("is-active"))} {onclick}></div>
    }
}

fn render_slide(slide: &SlideView, shown: bool) -> Html {
    html! {
        <div key={slide.index} class={classes!("mecom-slide", "fade-in", shown.then_some("show"))}>
            <div class="mecom-round-title">
                <div>{ &slide.label }</div>
            </div>
            { for slide.packs.iter().map(render_pack) }
        </div>
    }
}

fn render_pack(pack: &PackView) -> Html {
    html! {
        <div class="pack">
            <div class="pack-title">{ &pack.title }</div>
            <div class="pack-contents">
                { for pack.slots.iter().map(render_slot) }
            </div>
        </div>
    }
}

fn render_slot(slot: &SlotView) -> Html {
    match slot {
        SlotView::Empty { .. } => html! {
            <div class={slot.class_name()}>
                <div class="left"></div>
                <div class="name-wrap">
                    <div class="team-name">{ EMPTY_SLOT_LABEL }</div>
                </div>
            </div>
        },
        SlotView::Team(card) => render_team(card, slot.class_name()),
    }
}

fn render_team(card: &TeamCard, class: &'static str) -> Html {
    let tags = match &card.tags {
        Some(tags) => {
            let branch_class = classes!(
                "mecom-tag",
                tags.branch.as_ref().map(|branch| branch.direction.css_class())
            );
            let branch_text = tags
                .branch
                .as_ref()
                .map(|branch| branch.text.clone())
                .unwrap_or_default();
            html! {
                <>
                    <span class="mecom-tag mecom-tag-grade">{ &tags.grade }</span>
                    <span class={branch_class}>{ branch_text }</span>
                </>
            }
        }
        None => html! {},
    };

    let note = match &card.promoted_note {
        Some(note) => html! { <div class="promoted-note">{ note }</div> },
        None => html! {},
    };

    html! {
        <div class={class}>
            <div class="left">{ tags }</div>
            <div class="name-wrap">
                <div class="team-name">{ &card.name }</div>
                { note }
            </div>
        </div>
    }
}

fn touch_point(event: &Event) -> Option<Point> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some(Point::new(
        f64::from(touch.client_x()),
        f64::from(touch.client_y()),
    ))
}

fn mouse_point(event: &Event) -> Option<Point> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some(Point::new(
        f64::from(mouse.client_x()),
        f64::from(mouse.client_y()),
    ))
}

fn on_press(bracket: &SharedBracket, refresh: &UseForceUpdateHandle, point: Point) {
    bracket.borrow_mut().press(point, js_sys::Date::now());
    refresh.force_update();
}

fn on_drag(bracket: &SharedBracket, refresh: &UseForceUpdateHandle, event: &Event, point: Point) {
    let effect = bracket.borrow_mut().drag(point, js_sys::Date::now());
    if effect.locks_scroll() {
        event.prevent_default();
    }
    if effect != DragEffect::Ignored {
        refresh.force_update();
    }
}

fn on_release(bracket: &SharedBracket, refresh: &UseForceUpdateHandle) {
    let settled = bracket.borrow_mut().release(js_sys::Date::now());
    if let Some(index) = settled {
        debug!("Swipe settled on round {}", index);
        refresh.force_update();
    }
}

fn attach_gestures(
    swiper_ref: &NodeRef,
    track_ref: &NodeRef,
    bracket: SharedBracket,
    refresh: UseForceUpdateHandle,
) -> Vec<EventListener> {
    let Some(swiper) = swiper_ref.cast::<HtmlElement>() else {
        warn!("Bracket viewport is not mounted; swiping disabled");
        return Vec::new();
    };
    let Some(window) = web_sys::window() else {
        return Vec::new();
    };

    bracket.borrow_mut().resize(f64::from(swiper.client_width()));
    fit_active_slide(&bracket, track_ref);
    refresh.force_update();

    let mut listeners = Vec::with_capacity(7);

    {
        let bracket = bracket.clone();
        let refresh = refresh.clone();
        listeners.push(EventListener::new(&swiper, "touchstart", move |event| {
            if let Some(point) = touch_point(event) {
                on_press(&bracket, &refresh, point);
            }
        }));
    }

    {
        let bracket = bracket.clone();
        let refresh = refresh.clone();
        listeners.push(EventListener::new_with_options(
            &swiper,
            "touchmove",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                if let Some(point) = touch_point(event) {
                    on_drag(&bracket, &refresh, event, point);
                }
            },
        ));
    }

    {
        let bracket = bracket.clone();
        let refresh = refresh.clone();
        listeners.push(EventListener::new(&swiper, "touchend", move |_| {
            on_release(&bracket, &refresh);
        }));
    }

    {
        let bracket = bracket.clone();
        let refresh = refresh.clone();
        listeners.push(EventListener::new_with_options(
            &swiper,
            "mousedown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                event.prevent_default();
                if let Some(point) = mouse_point(event) {
                    on_press(&bracket, &refresh, point);
                }
            },
        ));
    }

    {
        let bracket = bracket.clone();
        let refresh = refresh.clone();
        listeners.push(EventListener::new_with_options(
            &window,
            "mousemove",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                if let Some(point) = mouse_point(event) {
                    on_drag(&bracket, &refresh, event, point);
                }
            },
        ));
    }

    {
        let bracket = bracket.clone();
        let refresh = refresh.clone();
        listeners.push(EventListener::new(&window, "mouseup", move |_| {
            on_release(&bracket, &refresh);
        }));
    }

    {
        let track_ref = track_ref.clone();
        listeners.push(EventListener::new(&window, "resize", move |_| {
            bracket.borrow_mut().resize(f64::from(swiper.client_width()));
            fit_active_slide(&bracket, &track_ref);
            refresh.force_update();
        }));
    }

    listeners
}

/// Measures the active slide and sizes the viewport to it. Returns whether the
/// height changed.
fn fit_active_slide(bracket: &SharedBracket, track_ref: &NodeRef) -> bool {
    let (index, before) = {
        let bracket = bracket.borrow();
        (bracket.current(), bracket.viewport_height())
    };
    let measured = track_ref
        .cast::<Element>()
        .and_then(|track| track.children().item(index as u32))
        .map(|slide| slide.get_bounding_client_rect().height());
    let after = bracket.borrow_mut().fit_height(measured);
    after != before
}

fn schedule_height_fit(
    bracket: SharedBracket,
    track_ref: NodeRef,
    refresh: UseForceUpdateHandle,
    delay_ms: u32,
) {
    Timeout::new(delay_ms, move || {
        if fit_active_slide(&bracket, &track_ref) {
            refresh.force_update();
        }
    })
    .forget();
}

fn mount_point() -> Result<Element, BracketError> {
    web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.query_selector(MOUNT_SELECTOR).ok().flatten())
        .ok_or_else(|| BracketError::MissingMount(MOUNT_SELECTOR.to_owned()))
}

#[wasm_bindgen(start)]
pub fn run_app() {
    console_error_panic_hook::set_once();

    let root = match mount_point() {
        Ok(root) => root,
        Err(err) => {
            warn!("[MECOM] {}; bracket not initialized", err);
            return;
        }
    };

    let config = BracketConfig::from_element(&root);
    debug!("Mounting bracket with storage key {}", config.storage_key);
    yew::Renderer::<BracketApp>::with_root_and_props(root, BracketProps { config }).render();
}
