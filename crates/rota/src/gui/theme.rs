use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;
use rota_core::render::WheelStyle;

pub struct ThemeColors {
    pub background: Srgba<f64>,
    pub outline: Srgba<f64>,
    pub label: Srgba<f64>,
    pub pointer: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        let fallback = WheelStyle::default();
        Self {
            background: Self::lookup_color(
                context,
                "theme_base_color",
                Srgba::new(0.04, 0.07, 0.13, 1.0),
                None,
            ),
            outline: Self::lookup_color(context, "borders", fallback.outline, Some(0.35)),
            label: fallback.label,
            pointer: Self::lookup_color(
                context,
                "theme_selected_fg_color",
                fallback.pointer,
                Some(1.0),
            ),
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }

    pub fn wheel_style(&self) -> WheelStyle {
        WheelStyle {
            background: Some(self.background),
            outline: self.outline,
            label: self.label,
            pointer: self.pointer,
        }
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.rota-popup {
    background: rgba(0, 0, 0, 0.7);
    border: 3px solid #60a5fa;
    border-radius: 12px;
    box-shadow: 0 4px 20px rgba(0, 0, 0, 0.5);
    color: #ffffff;
    font-weight: 700;
    font-size: 20px;
}
.rota-layer-row.selected {
    font-weight: bold;
}
.rota-status {
    color: #f87171;
    font-weight: bold;
}
.rota-dim {
    opacity: 0.6;
    font-size: smaller;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
