use crate::gui::app::{AppModel, AppMsg};
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::ComponentSender;
use rota_core::Wheel;
use rota_core::sector::{MAX_SECTORS, MIN_SECTORS};

/// Side panel editing the active wheel. Built imperatively since its rows
/// follow the wheel's layer and sector lists.
pub struct Editor {
    pub root: gtk::Box,
    title: gtk::Label,
    layers: gtk::ListBox,
    selected_name: gtk::Label,
    name_entry: gtk::Entry,
    name_handler: glib::SignalHandlerId,
    sector_count: gtk::SpinButton,
    labels_box: gtk::Box,
    label_entries: Vec<gtk::Entry>,
    results: gtk::Label,
    status: gtk::Label,
}

fn heading(text: &str) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.set_xalign(0.0);
    label.add_css_class("heading");
    label
}

fn button(text: &str, sender: &ComponentSender<AppModel>, msg: fn() -> AppMsg) -> gtk::Button {
    let button = gtk::Button::with_label(text);
    let sender = sender.clone();
    button.connect_clicked(move |_| sender.input(msg()));
    button
}

fn clear_box(container: &gtk::Box) {
    while let Some(child) = container.first_child() {
        container.remove(&child);
    }
}

impl Editor {
    pub fn new(sender: &ComponentSender<AppModel>) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 8);
        root.set_width_request(300);

        let title = heading("");
        root.append(&title);

        let actions = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        actions.append(&button("Spin", sender, || AppMsg::SpinAll));
        actions.append(&button("Stop", sender, || AppMsg::StopAll));
        actions.append(&button("Add layer", sender, || AppMsg::AddLayer));
        actions.append(&button("Remove layer", sender, || AppMsg::RemoveLayer));
        root.append(&actions);

        let status = gtk::Label::new(None);
        status.set_xalign(0.0);
        status.set_wrap(true);
        status.add_css_class("rota-status");
        status.set_visible(false);
        root.append(&status);

        root.append(&heading("Layers"));
        let layers = gtk::ListBox::new();
        layers.set_selection_mode(gtk::SelectionMode::Single);
        {
            let sender = sender.clone();
            layers.connect_row_activated(move |_, row| {
                if let Ok(index) = usize::try_from(row.index()) {
                    sender.input(AppMsg::SelectLayer(index));
                }
            });
        }
        root.append(&layers);

        let selected_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        selected_row.append(&gtk::Label::new(Some("Selected:")));
        let selected_name = gtk::Label::new(Some("None"));
        selected_row.append(&selected_name);
        root.append(&selected_row);

        let name_entry = gtk::Entry::new();
        name_entry.set_placeholder_text(Some("Layer name"));
        let name_handler = {
            let sender = sender.clone();
            name_entry.connect_changed(move |entry| {
                sender.input(AppMsg::Rename(entry.text().to_string()));
            })
        };
        root.append(&name_entry);

        let count_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        count_row.append(&gtk::Label::new(Some("Sectors")));
        let sector_count =
            gtk::SpinButton::with_range(MIN_SECTORS as f64, MAX_SECTORS as f64, 1.0);
        count_row.append(&sector_count);
        {
            let sender = sender.clone();
            let sector_count = sector_count.clone();
            let apply = gtk::Button::with_label("Apply");
            apply.connect_clicked(move |_| {
                sender.input(AppMsg::ApplySectorCount(sector_count.value_as_int() as usize));
            });
            count_row.append(&apply);
        }
        root.append(&count_row);

        root.append(&heading("Sector labels"));
        let labels_box = gtk::Box::new(gtk::Orientation::Vertical, 4);
        let scroller = gtk::ScrolledWindow::new();
        scroller.set_min_content_height(200);
        scroller.set_vexpand(true);
        scroller.set_child(Some(&labels_box));
        root.append(&scroller);
        root.append(&button("Save labels", sender, || AppMsg::SaveLabels));

        root.append(&heading("Results"));
        let results = gtk::Label::new(None);
        results.set_xalign(0.0);
        results.set_wrap(true);
        root.append(&results);

        Self {
            root,
            title,
            layers,
            selected_name,
            name_entry,
            name_handler,
            sector_count,
            labels_box,
            label_entries: Vec::new(),
            results,
            status,
        }
    }

    /// Rebuilds every row from the wheel's current state.
    pub fn refresh(&mut self, wheel: &Wheel, results: &str) {
        self.title.set_text(&format!("Editing '{}'", wheel.key()));
        self.refresh_layers(wheel);
        self.refresh_selection(wheel);
        self.results.set_text(results);
    }

    /// Updates the layer list and selected name without touching the inputs.
    pub fn refresh_layers(&self, wheel: &Wheel) {
        self.selected_name
            .set_text(wheel.selected_layer().map_or("None", |l| l.name()));
        while let Some(child) = self.layers.first_child() {
            self.layers.remove(&child);
        }
        let selected = wheel.selected_id();
        for layer in wheel.layers() {
            let row = gtk::Box::new(gtk::Orientation::Horizontal, 8);
            row.add_css_class("rota-layer-row");
            if Some(layer.id()) == selected {
                row.add_css_class("selected");
            }
            let name = gtk::Label::new(Some(layer.name()));
            name.set_hexpand(true);
            name.set_xalign(0.0);
            row.append(&name);

            let count = gtk::Label::new(Some(&format!("{} sectors", layer.sector_count())));
            count.add_css_class("rota-dim");
            row.append(&count);

            let tail: String = {
                let chars: Vec<char> = layer.id().chars().collect();
                chars[chars.len().saturating_sub(4)..].iter().collect()
            };
            let id = gtk::Label::new(Some(&format!("id:{}", tail)));
            id.add_css_class("rota-dim");
            row.append(&id);

            self.layers.append(&row);
        }
    }

    fn refresh_selection(&mut self, wheel: &Wheel) {
        clear_box(&self.labels_box);
        self.label_entries.clear();

        let Some(layer) = wheel.selected_layer() else {
            self.set_name_text("");
            self.name_entry.set_sensitive(false);
            return;
        };

        self.name_entry.set_sensitive(true);
        if self.name_entry.text().trim() != layer.name() {
            self.set_name_text(layer.name());
        }
        self.sector_count.set_value(layer.sector_count() as f64);

        for (i, sector) in layer.sectors().iter().enumerate() {
            let row = gtk::Box::new(gtk::Orientation::Vertical, 2);
            let label = gtk::Label::new(Some(&format!("Sector {}", i + 1)));
            label.set_xalign(0.0);
            label.add_css_class("rota-dim");
            let entry = gtk::Entry::new();
            entry.set_text(&sector.label);
            row.append(&label);
            row.append(&entry);
            self.labels_box.append(&row);
            self.label_entries.push(entry);
        }
    }

    fn set_name_text(&self, text: &str) {
        self.name_entry.block_signal(&self.name_handler);
        self.name_entry.set_text(text);
        self.name_entry.unblock_signal(&self.name_handler);
    }

    /// Shows `text` on the status line, hiding the line when it is empty.
    pub fn set_status(&self, text: &str) {
        self.status.set_text(text);
        self.status.set_visible(!text.is_empty());
    }

    pub fn labels(&self) -> Vec<String> {
        self.label_entries
            .iter()
            .map(|e| e.text().to_string())
            .collect()
    }
}
