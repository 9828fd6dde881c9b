use chrono::{DateTime, Local, Utc};
use plotly::{
    common::{color::Rgb, Line, Marker, Mode, Title},
    configuration::DisplayModeBar,
    layout::{Axis, HoverMode, Margin},
    Configuration, Layout, Plot, Scatter,
};
use yew::prelude::*;

const CHART_DIV: &str = "levels-chart";

// #ffcc33
fn oil_color() -> Rgb {
    Rgb::new(255, 204, 51)
}

// #4682b4
fn water_color() -> Rgb {
    Rgb::new(70, 130, 180)
}

#[derive(Properties, PartialEq)]
pub struct Props {
    /// Chronological series, one entry per reading.
    pub timestamps: Vec<DateTime<Utc>>,
    pub oil: Vec<f64>,
    pub water: Vec<f64>,
}

#[function_component(LevelChart)]
pub fn level_chart(props: &Props) -> Html {
    let x: Vec<String> = props
        .timestamps
        .iter()
        .map(|ts| {
            DateTime::<Local>::from(*ts)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .collect();

    let p = yew_hooks::use_async::<_, _, ()>({
        let mut plot = Plot::new();

        let oil = Scatter::new(x.clone(), props.oil.clone())
            .mode(Mode::LinesMarkers)
            .name("Oil")
            .marker(Marker::new().color(oil_color()))
            .line(Line::new().color(oil_color()));
        let water = Scatter::new(x, props.water.clone())
            .mode(Mode::LinesMarkers)
            .name("Water")
            .marker(Marker::new().color(water_color()))
            .line(Line::new().color(water_color()));
        plot.add_trace(oil);
        plot.add_trace(water);

        plot.set_configuration(
            Configuration::default()
                .display_logo(false)
                .editable(false)
                .display_mode_bar(DisplayModeBar::Hover),
        );

        plot.set_layout(
            Layout::default()
                .hover_mode(HoverMode::XUnified)
                .auto_size(true)
                .height(370)
                .margin(Margin::default().top(10).bottom(60).left(60).right(20))
                .x_axis(Axis::new().title(Title::new("Timestamp (UTC)")))
                .y_axis(Axis::new().title(Title::new("Level (cm)"))),
        );

        async move {
            plotly::bindings::new_plot(CHART_DIV, &plot).await;
            Ok(())
        }
    });

    use_effect_with(
        // replot whenever the series change
        (
            props.timestamps.clone(),
            props.oil.clone(),
            props.water.clone(),
        ),
        move |_| {
            p.run();
            || ()
        },
    );

    html! {
        <div class="chart" id={CHART_DIV}></div>
    }
}
