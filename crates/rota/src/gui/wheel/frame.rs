use gtk::prelude::*;
use gtk4 as gtk;
use rota_core::{TickOutcome, Wheel};
use std::cell::RefCell;
use std::rc::Rc;

/// Drives a wheel's spin from the widget's frame clock. At most one tick
/// callback is installed at a time.
#[derive(Default)]
pub struct FrameDriver {
    id: Rc<RefCell<Option<gtk::TickCallbackId>>>,
}

impl FrameDriver {
    pub fn is_active(&self) -> bool {
        self.id.borrow().is_some()
    }

    pub fn start<F>(&self, area: &gtk::DrawingArea, wheel: Rc<RefCell<Wheel>>, on_settled: F)
    where
        F: Fn() + 'static,
    {
        if self.is_active() {
            return;
        }

        let slot = self.id.clone();
        let id = area.add_tick_callback(move |area, _clock| {
            let outcome = wheel.borrow_mut().tick();
            area.queue_draw();
            match outcome {
                TickOutcome::Running => glib::ControlFlow::Continue,
                TickOutcome::Settled | TickOutcome::Idle => {
                    // GTK drops the callback once we return Break
                    slot.borrow_mut().take();
                    if outcome == TickOutcome::Settled {
                        on_settled();
                    }
                    glib::ControlFlow::Break
                }
            }
        });
        *self.id.borrow_mut() = Some(id);
    }

    pub fn stop(&self) {
        if let Some(id) = self.id.borrow_mut().take() {
            id.remove();
        }
    }
}
