use crate::config;
use crate::events::AppEvent;
use crate::gui::editor::Editor;
use crate::gui::theme;
use crate::gui::wheel::WheelView;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use rota_core::{EditError, Point, Wheel};

pub struct AppModel {
    pub views: Vec<WheelView>,
    pub active: usize,
    pub editor: Editor,
}

#[derive(Debug)]
pub enum AppMsg {
    SpinAll,
    StopAll,
    Settled(usize),
    WheelClicked(usize, Point),
    DismissPopup(usize),
    AddLayer,
    RemoveLayer,
    SelectLayer(usize),
    Rename(String),
    ApplySectorCount(usize),
    SaveLabels,
    Reload,
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Spin => AppMsg::SpinAll,
            AppEvent::Stop => AppMsg::StopAll,
            AppEvent::Reload => AppMsg::Reload,
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

impl AppModel {
    fn active_view(&self) -> Option<&WheelView> {
        self.views.get(self.active)
    }

    fn refresh_editor(&mut self) {
        if let Some(view) = self.views.get(self.active) {
            self.editor
                .refresh(&view.wheel.borrow(), view.results_text());
        }
    }

    /// Applies an edit to the active wheel and refreshes the panel. A rejected
    /// edit leaves the wheel as it was and is shown on the status line.
    fn edit<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut Wheel) -> Result<(), EditError>,
    {
        let Some(view) = self.active_view() else {
            return;
        };
        let result = edit(&mut view.wheel.borrow_mut());
        view.redraw();
        self.report(&result);
        self.refresh_editor();
    }

    fn report(&self, result: &Result<(), EditError>) {
        if let Err(e) = result {
            log::warn!("Edit rejected: {}", e);
        }
        self.editor.set_status(&edit_status(result));
    }
}

/// Status line text after an edit: empty on success, the reason otherwise.
fn edit_status(result: &Result<(), EditError>) -> String {
    match result {
        Ok(()) => String::new(),
        Err(e) => e.to_string(),
    }
}

/// Why pressing spin did nothing, when the user can do something about it.
fn spin_refusal(started: usize, layer_counts: &[usize]) -> Option<&'static str> {
    (started == 0 && layer_counts.iter().all(|&n| n == 0))
        .then_some("Add a layer before spinning")
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (Vec<Wheel>, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        gtk::ApplicationWindow {
            set_title: Some("Rota"),
            set_default_size: (1280, 720),

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(AppMsg::StopAll);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "content"]
            gtk::Box {
                set_orientation: gtk::Orientation::Horizontal,
                set_spacing: 16,
                set_margin_top: 16,
                set_margin_bottom: 16,
                set_margin_start: 16,
                set_margin_end: 16,

                gtk::ScrolledWindow {
                    set_hexpand: true,
                    set_vexpand: true,

                    #[name = "wheel_row"]
                    gtk::Box {
                        set_orientation: gtk::Orientation::Horizontal,
                        set_spacing: 24,
                        set_halign: gtk::Align::Center,
                        set_valign: gtk::Align::Center,
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (wheels, rx) = init;

        theme::load_css();

        let views: Vec<WheelView> = wheels
            .into_iter()
            .enumerate()
            .map(|(i, wheel)| WheelView::new(i, wheel, &sender))
            .collect();
        let editor = Editor::new(&sender);

        let mut model = AppModel {
            views,
            active: 0,
            editor,
        };

        let widgets = view_output!();

        for view in &model.views {
            widgets.wheel_row.append(&view.overlay);
        }
        widgets.content.append(&model.editor.root);
        model.refresh_editor();

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::SpinAll => {
                let mut started = 0;
                for (i, view) in self.views.iter_mut().enumerate() {
                    if view.spin(i, &sender) {
                        started += 1;
                    }
                }
                let layer_counts: Vec<usize> = self
                    .views
                    .iter()
                    .map(|v| v.wheel.borrow().layers().len())
                    .collect();
                self.editor
                    .set_status(spin_refusal(started, &layer_counts).unwrap_or_default());
                self.refresh_editor();
            }
            AppMsg::StopAll => {
                for view in &mut self.views {
                    view.stop();
                }
                self.refresh_editor();
            }
            AppMsg::Settled(i) => {
                if let Some(view) = self.views.get_mut(i) {
                    view.settled();
                }
                if i == self.active {
                    self.refresh_editor();
                }
            }
            AppMsg::WheelClicked(i, point) => {
                let Some(view) = self.views.get(i) else {
                    return;
                };
                self.active = i;
                let result = {
                    let mut wheel = view.wheel.borrow_mut();
                    match wheel.layer_at(point).cloned() {
                        Some(id) => wheel.select_layer(&id),
                        None => Ok(()),
                    }
                };
                view.redraw();
                self.report(&result);
                self.refresh_editor();
            }
            AppMsg::DismissPopup(i) => {
                if let Some(view) = self.views.get(i) {
                    view.hide_popup();
                }
            }
            AppMsg::AddLayer => self.edit(|wheel| wheel.create_default_layer().map(|_| ())),
            AppMsg::RemoveLayer => self.edit(|wheel| wheel.remove_selected_layer().map(|_| ())),
            AppMsg::SelectLayer(index) => {
                if let Some(view) = self.active_view() {
                    view.wheel.borrow_mut().select_index(index);
                    view.redraw();
                }
                self.refresh_editor();
            }
            AppMsg::Rename(text) => {
                let Some(view) = self.active_view() else {
                    return;
                };
                let result = view.wheel.borrow_mut().rename_selected_layer(&text);
                self.report(&result);
                self.editor.refresh_layers(&view.wheel.borrow());
            }
            AppMsg::ApplySectorCount(count) => self.edit(|wheel| wheel.set_sector_count(count)),
            AppMsg::SaveLabels => {
                let labels = self.editor.labels();
                self.edit(|wheel| wheel.set_sector_labels(labels.as_slice()));
            }
            AppMsg::Reload => {
                for view in &self.views {
                    if view.wheel.borrow_mut().reload() {
                        view.redraw();
                    }
                }
                self.refresh_editor();
                log::info!("Wheels reloaded from storage");
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    for view in &self.views {
                        let settings = {
                            let wheel = view.wheel.borrow();
                            new_config.settings_for(Some(wheel.key()))
                        };
                        {
                            let mut wheel = view.wheel.borrow_mut();
                            wheel.set_tuning(settings.spin);
                            wheel.set_new_layer_sectors(settings.new_layer_sectors);
                        }
                        view.set_canvas(settings.canvas);
                    }
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_status_shows_rejection_reason() {
        assert_eq!(edit_status(&Ok(())), "");
        assert_eq!(edit_status(&Err(EditError::NoSelection)), "Select a layer first");
        assert_eq!(
            edit_status(&Err(EditError::SectorCount(30))),
            "Sectors must be between 2 and 24, got 30"
        );
    }

    #[test]
    fn test_spin_refusal_only_for_empty_wheels() {
        assert_eq!(spin_refusal(0, &[0, 0]), Some("Add a layer before spinning"));
        assert_eq!(spin_refusal(0, &[]), Some("Add a layer before spinning"));
        // already running
        assert_eq!(spin_refusal(0, &[3, 0]), None);
        assert_eq!(spin_refusal(1, &[3, 0]), None);
    }
}
