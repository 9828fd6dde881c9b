use yew::prelude::*;

use crate::levels::TankSettings;

/// Percentage clamped to [0, 100]; non-finite values collapse to 0.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Stacked-layer geometry for the tank widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub oil: f64,
    pub water: f64,
    pub filled: f64,
    pub empty: f64,
    /// Operational-capacity marker as a percentage of tank height, absent
    /// when the height is zero.
    pub operational_line: Option<f64>,
}

impl Fill {
    pub fn compute(levels: [f64; 2], settings: TankSettings) -> Self {
        let oil = clamp_percent(levels[0]);
        let water = clamp_percent(levels[1]);
        let filled = (oil + water).min(100.0);
        let empty = (100.0 - filled).max(0.0);
        let operational_line = (settings.height != 0.0)
            .then(|| clamp_percent(settings.capacity / settings.height * 100.0));
        Self {
            oil,
            water,
            filled,
            empty,
            operational_line,
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct Props {
    /// `[oil, water]` as percentages of the configured height.
    pub levels: [f64; 2],
    pub settings: TankSettings,
}

#[function_component(TankView)]
pub fn tank_view(props: &Props) -> Html {
    let fill = Fill::compute(props.levels, props.settings);

    html! {
        <div class="tank-wrapper">
            <div class="tank-container">
                // layered from the bottom: oil, then water
                <div class="layer oil" style={format!("height: {}%", fill.oil)} />
                <div class="layer water" style={format!("height: {}%", fill.water)} />

                if let Some(line) = fill.operational_line {
                    <div class="operational-line" style={format!("bottom: {line}%")} />
                }
            </div>

            <div class="tank-labels">
                <div class="tank-label">
                    <span class="color-indicator indicator-oil" />
                    { format!("Oil: {:.1}%", fill.oil) }
                </div>
                <div class="tank-label">
                    <span class="color-indicator indicator-water" />
                    { format!("Water: {:.1}%", fill.water) }
                </div>
                <div class="tank-label">
                    <span class="color-indicator indicator-empty" />
                    { format!("Empty: {:.1}%", fill.empty) }
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp_percent(-5.0), 0.0);
        assert_eq!(clamp_percent(150.0), 100.0);
        assert_eq!(clamp_percent(f64::NAN), 0.0);
        assert_eq!(clamp_percent(42.5), 42.5);
    }

    #[test]
    fn overfull_tank_clamps_to_full() {
        let fill = Fill::compute(
            [30.0, 80.0],
            TankSettings {
                height: 100.0,
                capacity: 0.0,
            },
        );
        assert_eq!(fill.oil, 30.0);
        assert_eq!(fill.water, 80.0);
        assert_eq!(fill.filled, 100.0);
        assert_eq!(fill.empty, 0.0);
    }

    #[test]
    fn operational_line_position() {
        let fill = Fill::compute(
            [0.0, 0.0],
            TankSettings {
                height: 100.0,
                capacity: 80.0,
            },
        );
        assert_eq!(fill.operational_line, Some(80.0));
    }

    #[test]
    fn operational_line_absent_without_height() {
        let fill = Fill::compute(
            [0.0, 0.0],
            TankSettings {
                height: 0.0,
                capacity: 80.0,
            },
        );
        assert_eq!(fill.operational_line, None);
    }
}
