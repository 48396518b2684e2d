use bitflags::bitflags;

bitflags! {
    /// Event kinds a subscription is interested in.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct EventMask: u32 {
        const QUIT              = 1 << 0;
        const MOUSE_MOTION      = 1 << 1;
        const MOUSE_BUTTON_DOWN = 1 << 2;
        const MOUSE_BUTTON_UP   = 1 << 3;
        const ASCII_KEY_DOWN    = 1 << 4;
        const ASCII_KEY_UP      = 1 << 5;
        const SPECIAL_KEY_DOWN  = 1 << 6;
        const SPECIAL_KEY_UP    = 1 << 7;

        const MOUSE_BUTTON = Self::MOUSE_BUTTON_DOWN.bits() | Self::MOUSE_BUTTON_UP.bits();
        const ASCII_KEY    = Self::ASCII_KEY_DOWN.bits() | Self::ASCII_KEY_UP.bits();
        const SPECIAL_KEY  = Self::SPECIAL_KEY_DOWN.bits() | Self::SPECIAL_KEY_UP.bits();
    }
}

/// Press or release.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Edge {
    Down,
    Up,
}

/// Mouse buttons the engine reports.
///
/// Input bases drop any other button (back, forward, extra buttons) rather
/// than folding it into one of these.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Keys without an ASCII representation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SpecialKey {
    Escape,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    Shift,
    Control,
    Alt,
    Meta,

    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

/// Pointer motion.
///
/// `x`/`y` are logical coordinates, `xraw`/`yraw` the physical position
/// reported by the backend, `dx`/`dy` the physical movement since the previous
/// motion.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct MotionEvent {
    pub x: i32,
    pub y: i32,
    pub xraw: i32,
    pub yraw: i32,
    pub dx: i32,
    pub dy: i32,
}

/// Normalized input event delivered to subscribers.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Event {
    /// The platform asked the application to close. The engine keeps running
    /// until the application stops calling into it.
    Quit,
    MouseMotion(MotionEvent),
    MouseButton { button: MouseButton, edge: Edge },
    KeyAscii { code: u8, edge: Edge },
    KeySpecial { key: SpecialKey, edge: Edge },
}

impl Event {
    /// The single mask bit identifying this event.
    pub fn kind(&self) -> EventMask {
        match self {
            Event::Quit => EventMask::QUIT,
            Event::MouseMotion(_) => EventMask::MOUSE_MOTION,
            Event::MouseButton { edge: Edge::Down, .. } => EventMask::MOUSE_BUTTON_DOWN,
            Event::MouseButton { edge: Edge::Up, .. } => EventMask::MOUSE_BUTTON_UP,
            Event::KeyAscii { edge: Edge::Down, .. } => EventMask::ASCII_KEY_DOWN,
            Event::KeyAscii { edge: Edge::Up, .. } => EventMask::ASCII_KEY_UP,
            Event::KeySpecial { edge: Edge::Down, .. } => EventMask::SPECIAL_KEY_DOWN,
            Event::KeySpecial { edge: Edge::Up, .. } => EventMask::SPECIAL_KEY_UP,
        }
    }
}

/// Backend-neutral native event, before normalization.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RawInput {
    Quit,
    /// Pointer position in physical pixels.
    PointerMoved { x: i32, y: i32 },
    PointerButton { button: MouseButton, edge: Edge },
    /// A key with its ASCII code and/or special identity, as far as the
    /// backend could tell.
    Key {
        ascii: Option<u8>,
        special: Option<SpecialKey>,
        edge: Edge,
    },
}
