use gloo_timers::callback::Interval;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;
use yew_router::scope_ext::RouterScopeExt;

use crate::components::chart::LevelChart;
use crate::components::sensor_status::SensorStatus;
use crate::components::tank::TankView;
use crate::db::{TankId, TankRow};
use crate::levels::{self, LevelSeries, TankSettings};
use crate::request;
use crate::supabase::Supabase;
use crate::utils;
use crate::Route;

pub enum Msg {
    TanksLoaded(Vec<TankRow>),
    Selected(Option<TankId>),
    SampleCountChanged(usize),
    Poll,
    SettingsLoaded { epoch: u64, settings: TankSettings },
    ReadingsLoaded { epoch: u64, series: LevelSeries },
    Logout,
}

pub struct Home {
    supabase: Supabase,
    _context_handle: ContextHandle<Supabase>,
    tanks: Vec<TankRow>,
    selected: Option<TankId>,
    sample_count: usize,
    settings: TankSettings,
    series: LevelSeries,
    /// Polling generation; completions from an earlier selection are
    /// dropped.
    epoch: u64,
    poll: Option<Interval>,
}

impl Component for Home {
    type Message = Msg;

    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let (supabase, handle) = ctx
            .link()
            .context::<Supabase>(Callback::noop())
            .expect("no backend client in context");
        Self {
            supabase,
            _context_handle: handle,
            tanks: Vec::new(),
            selected: None,
            sample_count: levels::DEFAULT_SAMPLE_COUNT,
            settings: TankSettings::default(),
            series: LevelSeries::default(),
            epoch: 0,
            poll: None,
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render {
            let supabase = self.supabase.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                match request::tanks(&supabase).await {
                    Ok(tanks) => link.send_message(Msg::TanksLoaded(tanks)),
                    Err(err) => log::error!("loading tank list: {err}"),
                }
            });
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::TanksLoaded(tanks) => {
                self.tanks = tanks;
                true
            }
            Msg::Selected(tank) => {
                if self.selected == tank {
                    return false;
                }
                self.selected = tank;
                self.epoch += 1;
                self.poll = None;
                if self.selected.is_some() {
                    self.load_settings(ctx);
                    self.start_polling(ctx);
                }
                true
            }
            Msg::SampleCountChanged(count) => {
                if count == self.sample_count {
                    return false;
                }
                self.sample_count = count;
                if self.selected.is_some() {
                    // re-fetch right away; settings stay as loaded
                    self.epoch += 1;
                    self.start_polling(ctx);
                }
                true
            }
            Msg::Poll => {
                self.fetch_readings(ctx);
                false
            }
            Msg::SettingsLoaded { epoch, settings } => {
                if epoch != self.epoch {
                    return false;
                }
                self.settings = settings;
                true
            }
            Msg::ReadingsLoaded { epoch, series } => {
                if epoch != self.epoch {
                    return false;
                }
                self.series = series;
                true
            }
            Msg::Logout => {
                let supabase = self.supabase.clone();
                let navigator = ctx.link().navigator().expect("no router in scope");
                spawn_local(async move {
                    if let Err(err) = supabase.sign_out().await {
                        log::error!("sign-out: {err}");
                    }
                    navigator.push(&Route::Login);
                });
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();

        let onchange_tank = link.callback(|e: Event| {
            let select = e.target().and_then(|t| t.dyn_into::<HtmlSelectElement>().ok());
            let value = select.map(|s| s.value()).unwrap_or_default();
            Msg::Selected(value.parse::<TankId>().ok())
        });

        let onchange_samples = link.batch_callback(|e: Event| -> Option<Msg> {
            let input = e.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok())?;
            input
                .value()
                .parse::<usize>()
                .ok()
                .filter(|count| *count >= 1)
                .map(Msg::SampleCountChanged)
        });

        let options = self.tanks.iter().map(|tank| {
            html! {
                <option
                    value={tank.id.to_string()}
                    selected={self.selected == Some(tank.id)}
                >
                    { tank.name.clone() }
                </option>
            }
        });

        let normalized = levels::normalized(self.series.current, self.settings.height);
        let age = self
            .series
            .newest()
            .map(|newest| utils::format_age(newest, chrono::Utc::now()));

        html! {
            <div class="container-home">
                <header class="header">
                    <div class="search-container">
                        <select onchange={onchange_tank}>
                            <option value="" selected={self.selected.is_none()}>
                                { "Select a tank" }
                            </option>
                            { for options }
                        </select>

                        if let Some(age) = age {
                            <span class="reading-age">{ format!("updated {age} ago") }</span>
                        }
                    </div>

                    <div class="nav-buttons">
                        <button onclick={link.callback(|_| Msg::Logout)}>{ "Exit" }</button>
                    </div>
                </header>

                <main class="dashboard-grid">
                    <div class="left-col">
                        <h2 class="col-title">{ "Sensors" }</h2>
                        <SensorStatus selected={self.selected} />

                        <div class="chart-wrapper">
                            <LevelChart
                                timestamps={self.series.timestamps.clone()}
                                oil={self.series.oil.clone()}
                                water={self.series.water.clone()}
                            />
                        </div>

                        <div class="samples-control">
                            <label for="samples">{ "Samples:" }</label>
                            if self.selected.is_some() {
                                <input
                                    id="samples"
                                    type="number"
                                    min="1"
                                    value={self.sample_count.to_string()}
                                    onchange={onchange_samples}
                                />
                            } else {
                                <span>{ "—" }</span>
                            }
                        </div>
                    </div>

                    <div class="right-col">
                        <h2 class="col-title">{ "Water & Oil Levels" }</h2>
                        <TankView levels={normalized} settings={self.settings} />
                    </div>
                </main>

                <footer id="footer">{ "Optical Profiler" }</footer>
            </div>
        }
    }
}

impl Home {
    fn load_settings(&self, ctx: &Context<Self>) {
        let Some(tank) = self.selected else { return };
        let epoch = self.epoch;
        let supabase = self.supabase.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            let settings = match request::tank_settings(&supabase, tank).await {
                Ok(row) => TankSettings::from_row(Some(row)),
                Err(err) => {
                    log::error!("loading settings for tank {tank}: {err}");
                    TankSettings::from_row(None)
                }
            };
            link.send_message(Msg::SettingsLoaded { epoch, settings });
        });
    }

    /// Immediate fetch, then one tick per interval until the handle drops.
    fn start_polling(&mut self, ctx: &Context<Self>) {
        self.fetch_readings(ctx);
        let link = ctx.link().clone();
        self.poll = Some(Interval::new(
            levels::POLL_INTERVAL.as_millis() as u32,
            move || link.send_message(Msg::Poll),
        ));
    }

    fn fetch_readings(&self, ctx: &Context<Self>) {
        let Some(tank) = self.selected else { return };
        let epoch = self.epoch;
        let limit = self.sample_count;
        let supabase = self.supabase.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            match request::level_readings(&supabase, tank, limit).await {
                Ok(rows) => link.send_message(Msg::ReadingsLoaded {
                    epoch,
                    series: LevelSeries::from_rows(&rows),
                }),
                // keep whatever is on screen
                Err(err) => log::error!("reading levels for tank {tank}: {err}"),
            }
        });
    }
}
