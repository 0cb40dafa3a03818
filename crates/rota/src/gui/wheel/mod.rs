pub mod frame;

use crate::gui::app::{AppModel, AppMsg};
use crate::gui::theme::ThemeColors;
use frame::FrameDriver;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::ComponentSender;
use rota_core::render::CairoSurface;
use rota_core::{CanvasSize, LayerResult, Point, Wheel};
use std::cell::RefCell;
use std::rc::Rc;

/// One wheel on screen: the drawing area, the result popup laid over it and
/// the frame driver animating it.
pub struct WheelView {
    pub wheel: Rc<RefCell<Wheel>>,
    pub overlay: gtk::Overlay,
    area: gtk::DrawingArea,
    popup: gtk::Button,
    popup_label: gtk::Label,
    frame: FrameDriver,
    results_text: String,
}

impl WheelView {
    pub fn new(index: usize, wheel: Wheel, sender: &ComponentSender<AppModel>) -> Self {
        let wheel = Rc::new(RefCell::new(wheel));

        let area = gtk::DrawingArea::new();
        area.add_css_class("rota-wheel");
        area.set_halign(gtk::Align::Center);
        area.set_valign(gtk::Align::Center);
        resize_area(&area, wheel.borrow().canvas());

        let wheel_draw = wheel.clone();
        area.set_draw_func(move |area, cr, _, _| {
            let colors = ThemeColors::from_context(&area.style_context());
            let mut surface = CairoSurface::new(cr);
            if let Err(e) = wheel_draw.borrow().draw(&mut surface, &colors.wheel_style()) {
                log::error!("Drawing error: {}", e);
            }
        });

        let click = gtk::GestureClick::new();
        {
            let sender = sender.clone();
            click.connect_pressed(move |_, _, x, y| {
                sender.input(AppMsg::WheelClicked(index, Point::new(x, y)));
            });
        }
        area.add_controller(click);

        let popup_label = gtk::Label::new(None);
        popup_label.set_justify(gtk::Justification::Center);
        popup_label.set_wrap(true);

        let popup = gtk::Button::new();
        popup.add_css_class("rota-popup");
        popup.set_has_frame(false);
        popup.set_child(Some(&popup_label));
        popup.set_visible(false);
        {
            let sender = sender.clone();
            popup.connect_clicked(move |_| sender.input(AppMsg::DismissPopup(index)));
        }

        let overlay = gtk::Overlay::new();
        overlay.set_child(Some(&area));
        overlay.add_overlay(&popup);

        Self {
            wheel,
            overlay,
            area,
            popup,
            popup_label,
            frame: FrameDriver::default(),
            results_text: String::new(),
        }
    }

    pub fn results_text(&self) -> &str {
        &self.results_text
    }

    pub fn redraw(&self) {
        self.area.queue_draw();
    }

    /// Starts a spin. Returns false when the wheel refused to spin.
    pub fn spin(&mut self, index: usize, sender: &ComponentSender<AppModel>) -> bool {
        if !self.wheel.borrow_mut().spin_all() {
            return false;
        }
        self.hide_popup();
        self.results_text = "Spinning...".to_string();
        let sender = sender.clone();
        self.frame.start(&self.area, self.wheel.clone(), move || {
            sender.input(AppMsg::Settled(index));
        });
        true
    }

    pub fn stop(&mut self) {
        self.frame.stop();
        let results = self.wheel.borrow_mut().stop_all();
        self.redraw();
        self.show_results(&results);
    }

    pub fn settled(&mut self) {
        let results = self.wheel.borrow().results();
        self.show_results(&results);
    }

    fn show_results(&mut self, results: &[LayerResult]) {
        if results.is_empty() {
            return;
        }
        self.popup_label.set_text(&popup_text(results));
        self.popup.set_visible(true);
        self.results_text = results_text(results);
    }

    pub fn hide_popup(&self) {
        self.popup.set_visible(false);
    }

    pub fn set_canvas(&self, canvas: CanvasSize) {
        self.wheel.borrow_mut().set_canvas(canvas);
        resize_area(&self.area, canvas);
        self.redraw();
    }
}

fn resize_area(area: &gtk::DrawingArea, canvas: CanvasSize) {
    area.set_content_width(canvas.width as i32);
    area.set_content_height(canvas.height as i32);
}

fn popup_text(results: &[LayerResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("Layer {}: {}", i + 1, r.label))
        .collect::<Vec<_>>()
        .join("\n")
}

fn results_text(results: &[LayerResult]) -> String {
    results
        .iter()
        .map(|r| format!("• {}", r))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::LayerId;

    fn result(name: &str, index: usize, label: &str) -> LayerResult {
        LayerResult {
            layer_id: LayerId::new(name.to_lowercase()),
            layer_name: name.to_string(),
            index,
            label: label.to_string(),
        }
    }

    #[test]
    fn test_popup_lists_layers_by_position() {
        let results = vec![result("Outer", 2, "Pizza"), result("Inner", 0, "Item 1")];
        assert_eq!(popup_text(&results), "Layer 1: Pizza\nLayer 2: Item 1");
    }

    #[test]
    fn test_results_text_uses_layer_names() {
        let results = vec![result("Outer", 2, "Pizza")];
        assert_eq!(results_text(&results), "• Outer: Sector 3 (Pizza)");
    }
}
