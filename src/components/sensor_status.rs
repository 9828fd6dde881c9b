use std::time::Duration;

use gloo_timers::callback::Timeout;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::db::TankId;
use crate::request;
use crate::sensors::{self, ReqId, Snapshot, StatusLoader};
use crate::supabase::Supabase;
use crate::utils;

const NBSP: &str = "\u{00A0}";

#[derive(Properties, PartialEq)]
pub struct Props {
    pub selected: Option<TankId>,
}

pub enum Msg {
    Fetched {
        req: ReqId,
        tank: TankId,
        masked: bool,
        /// Wall clock at fetch start, ms.
        started: f64,
        snapshot: Option<Snapshot>,
    },
    Settle {
        req: ReqId,
        tank: TankId,
    },
}

pub struct SensorStatus {
    supabase: Supabase,
    _context_handle: ContextHandle<Supabase>,
    loader: StatusLoader,
    mask_timer: Option<Timeout>,
}

impl Component for SensorStatus {
    type Message = Msg;

    type Properties = Props;

    fn create(ctx: &Context<Self>) -> Self {
        let (supabase, handle) = ctx
            .link()
            .context::<Supabase>(Callback::noop())
            .expect("no backend client in context");
        Self {
            supabase,
            _context_handle: handle,
            loader: StatusLoader::new(),
            mask_timer: None,
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render {
            self.apply_selection(ctx);
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if old_props.selected != ctx.props().selected {
            self.apply_selection(ctx);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Fetched {
                req,
                tank,
                masked,
                started,
                snapshot,
            } => {
                if !self.loader.complete(req, tank, snapshot) {
                    return false;
                }
                if !masked {
                    return self.loader.settle(req, tank);
                }

                let elapsed =
                    Duration::from_millis((utils::now_millis() - started).max(0.0) as u64);
                match sensors::mask_remaining(elapsed) {
                    Some(remaining) => {
                        // fast response: hold the mask until the minimum
                        // duration has passed
                        let link = ctx.link().clone();
                        self.mask_timer =
                            Some(Timeout::new(remaining.as_millis() as u32, move || {
                                link.send_message(Msg::Settle { req, tank });
                            }));
                        true
                    }
                    None => self.loader.settle(req, tank),
                }
            }
            Msg::Settle { req, tank } => {
                self.mask_timer = None;
                self.loader.settle(req, tank)
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let selected = ctx.props().selected;
        let metrics = self.loader.metrics();

        let no_selection = selected.is_none();
        let masked = self.loader.masked(selected);
        let tier_class = (!no_selection && !masked).then(|| metrics.tier().css_class());

        let value = |text: String| -> Html {
            if no_selection {
                html! { "-" }
            } else if masked {
                html! { {NBSP} }
            } else {
                html! { {text} }
            }
        };

        let container_class = classes!(
            "sensor-status",
            (self.loader.loading() || masked).then_some("is-loading"),
        );

        html! {
            <div class={container_class}>
                <div class="sensor-status-item">
                    <div class="label">{ "Active" }</div>
                    <div class="value">{ value(metrics.active.to_string()) }</div>
                </div>

                <div class="sensor-status-separator" />

                <div class="sensor-status-item">
                    <div class="label">{ "Failures" }</div>
                    <div class="value">{ value(metrics.failed.to_string()) }</div>
                </div>

                <div class="sensor-status-separator" />

                <div class={classes!("sensor-status-item", tier_class)}>
                    <div class="label">{ "System status" }</div>
                    <div class="value">{ value(format!("{}%", metrics.percent_active)) }</div>
                </div>
            </div>
        }
    }
}

impl SensorStatus {
    fn apply_selection(&mut self, ctx: &Context<Self>) {
        // a pending deferred settle belongs to the previous selection
        self.mask_timer = None;

        let Some(plan) = self.loader.select(ctx.props().selected) else {
            return;
        };

        let started = utils::now_millis();
        let supabase = self.supabase.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            let snapshot = match request::sensor_readings(&supabase, plan.tank).await {
                Ok(rows) => sensors::latest_snapshot(&rows),
                Err(err) => {
                    log::error!("loading sensor readings for tank {}: {err}", plan.tank);
                    None
                }
            };
            link.send_message(Msg::Fetched {
                req: plan.req,
                tank: plan.tank,
                masked: plan.masked,
                started,
                snapshot,
            });
        });
    }
}
