use anyhow::Result;
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use crate::config::EngineConfig;
use crate::coords::CoordinateSpace;
use crate::input::{
    Edge, EventDispatch, InputBase, InputFeed, MouseButton, Normalizer, RawInput, SpecialKey,
};

/// Translates a winit `WindowEvent` into backend-neutral raw input.
///
/// Returns `None` for events the engine does not report.
pub fn translate_window_event(event: &WindowEvent) -> Option<RawInput> {
    match event {
        WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(RawInput::Quit),

        WindowEvent::CursorMoved { position, .. } => Some(RawInput::PointerMoved {
            x: position.x.round() as i32,
            y: position.y.round() as i32,
        }),

        WindowEvent::MouseInput { state, button, .. } => {
            let button = map_mouse_button(*button)?;
            Some(RawInput::PointerButton { button, edge: map_state(*state) })
        }

        WindowEvent::KeyboardInput { event, .. } => {
            let (ascii, special) = map_logical_key(&event.logical_key);
            if ascii.is_none() && special.is_none() {
                return None;
            }
            Some(RawInput::Key { ascii, special, edge: map_state(event.state) })
        }

        _ => None,
    }
}

fn map_state(state: ElementState) -> Edge {
    match state {
        ElementState::Pressed => Edge::Down,
        ElementState::Released => Edge::Up,
    }
}

fn map_mouse_button(b: WinitMouseButton) -> Option<MouseButton> {
    match b {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        WinitMouseButton::Right => Some(MouseButton::Right),
        _ => None,
    }
}

/// Splits a logical key into its ASCII code and special identity.
pub fn map_logical_key(key: &Key) -> (Option<u8>, Option<SpecialKey>) {
    match key {
        Key::Character(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => (Some(c as u8), None),
                _ => (None, None),
            }
        }
        Key::Named(named) => map_named(*named),
        _ => (None, None),
    }
}

fn map_named(named: NamedKey) -> (Option<u8>, Option<SpecialKey>) {
    let special = match named {
        NamedKey::Enter => return (Some(b'\r'), None),
        NamedKey::Tab => return (Some(b'\t'), None),
        NamedKey::Backspace => return (Some(0x08), None),
        NamedKey::Space => return (Some(b' '), None),

        NamedKey::Escape => SpecialKey::Escape,

        NamedKey::ArrowUp => SpecialKey::ArrowUp,
        NamedKey::ArrowDown => SpecialKey::ArrowDown,
        NamedKey::ArrowLeft => SpecialKey::ArrowLeft,
        NamedKey::ArrowRight => SpecialKey::ArrowRight,

        NamedKey::Insert => SpecialKey::Insert,
        NamedKey::Delete => SpecialKey::Delete,
        NamedKey::Home => SpecialKey::Home,
        NamedKey::End => SpecialKey::End,
        NamedKey::PageUp => SpecialKey::PageUp,
        NamedKey::PageDown => SpecialKey::PageDown,

        NamedKey::Shift => SpecialKey::Shift,
        NamedKey::Control => SpecialKey::Control,
        NamedKey::Alt => SpecialKey::Alt,
        NamedKey::Super | NamedKey::Meta => SpecialKey::Meta,

        NamedKey::F1 => SpecialKey::F1,
        NamedKey::F2 => SpecialKey::F2,
        NamedKey::F3 => SpecialKey::F3,
        NamedKey::F4 => SpecialKey::F4,
        NamedKey::F5 => SpecialKey::F5,
        NamedKey::F6 => SpecialKey::F6,
        NamedKey::F7 => SpecialKey::F7,
        NamedKey::F8 => SpecialKey::F8,
        NamedKey::F9 => SpecialKey::F9,
        NamedKey::F10 => SpecialKey::F10,
        NamedKey::F11 => SpecialKey::F11,
        NamedKey::F12 => SpecialKey::F12,

        _ => return (None, None),
    };
    (None, Some(special))
}

/// Host-side handle that forwards window events into a [`WinitInput`].
///
/// Call [`handle_window_event`](Self::handle_window_event) from the host's
/// `ApplicationHandler::window_event`; the engine picks the input up on the
/// next `process_input`.
#[derive(Debug, Clone, Default)]
pub struct WinitEvents {
    feed: InputFeed,
}

impl WinitEvents {
    /// Returns true if the event was queued.
    pub fn handle_window_event(&self, event: &WindowEvent) -> bool {
        match translate_window_event(event) {
            Some(raw) => {
                self.feed.push(raw);
                true
            }
            None => false,
        }
    }
}

/// Input base fed from a host-owned winit event loop.
#[derive(Debug, Default)]
pub struct WinitInput {
    events: WinitEvents,
    normalizer: Normalizer,
}

impl WinitInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> WinitEvents {
        self.events.clone()
    }
}

impl InputBase for WinitInput {
    fn init(&mut self, _config: &EngineConfig) -> Result<()> {
        self.normalizer.reset();
        log::debug!("input: winit (host event loop)");
        Ok(())
    }

    fn cleanup(&mut self) {
        self.events.feed.clear();
        self.normalizer.reset();
    }

    fn poll_and_dispatch(&mut self, space: &CoordinateSpace, dispatch: &mut EventDispatch) -> usize {
        self.events.feed.drain_into(&mut self.normalizer, space, dispatch)
    }
}
