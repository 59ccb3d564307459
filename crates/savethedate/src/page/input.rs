use super::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
}

/// Raw input delivered to the page, already in browser conventions:
/// a positive `delta_y` scrolls down, touch `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Wheel { delta_y: f32 },
    TouchStart { y: f32 },
    TouchMove { y: f32 },
    Key(Key),
    Click { target: ElementId },
    PointerEnter { target: ElementId },
    PointerLeave { target: ElementId },
}

/// An input event on its way through the widgets.
#[derive(Debug)]
pub struct Dispatch {
    pub event: InputEvent,
    default_prevented: bool,
}

impl Dispatch {
    pub fn new(event: InputEvent) -> Self {
        Self {
            event,
            default_prevented: false,
        }
    }

    /// Suppress the page's own handling (scrolling) of this event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}
