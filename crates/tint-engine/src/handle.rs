//! Color handles: opaque, generation-scoped style resources.
//!
//! A [`ColorHandle`] is what the host attaches ranges to. It is a plain
//! copyable id; the style it names lives in the [`HandleArena`] of the
//! generation that allocated it. Disposing an arena consumes it, so a
//! generation's styles are released exactly once, and every later lookup
//! of one of its handles is detectably stale (the generation no longer
//! matches).

use std::fmt;

use tint_color::Rgb;

// ---------------------------------------------------------------------------
// ColorHandle
// ---------------------------------------------------------------------------

/// Opaque id of one renderable style.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorHandle {
    generation: u32,
    index: usize,
}

impl ColorHandle {
    /// The configuration generation that allocated this handle.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Position within its generation's arena.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

impl fmt::Debug for ColorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}#{}", self.generation, self.index)
    }
}

// ---------------------------------------------------------------------------
// HandleStyle
// ---------------------------------------------------------------------------

/// What a handle renders as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleStyle {
    /// Recolor the covered characters.
    Color(Rgb),
    /// Draw `glyph` before the covered range, optionally tinted.
    /// `width` is the glyph's display width in terminal columns.
    Glyph {
        glyph: String,
        width: usize,
        color: Option<Rgb>,
    },
}

impl HandleStyle {
    /// The color carried by this style, if any.
    #[must_use]
    pub const fn color(&self) -> Option<Rgb> {
        match self {
            Self::Color(c) => Some(*c),
            Self::Glyph { color, .. } => *color,
        }
    }
}

// ---------------------------------------------------------------------------
// HandleArena
// ---------------------------------------------------------------------------

/// Owner of every style allocated for one generation.
#[derive(Debug)]
pub struct HandleArena {
    generation: u32,
    styles: Vec<HandleStyle>,
}

/// Receipt returned when an arena is disposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disposed {
    pub generation: u32,
    pub count: usize,
}

impl HandleArena {
    /// An empty arena for `generation`.
    #[must_use]
    pub const fn new(generation: u32) -> Self {
        Self {
            generation,
            styles: Vec::new(),
        }
    }

    /// Store a style and return its handle.
    pub fn alloc(&mut self, style: HandleStyle) -> ColorHandle {
        let index = self.styles.len();
        self.styles.push(style);
        ColorHandle {
            generation: self.generation,
            index,
        }
    }

    /// Style of `handle`, or `None` if it belongs to another generation.
    #[must_use]
    pub fn get(&self, handle: ColorHandle) -> Option<&HandleStyle> {
        if handle.generation != self.generation {
            return None;
        }
        self.styles.get(handle.index)
    }

    /// The generation this arena serves.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Whether nothing has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Every handle in allocation order.
    pub fn handles(&self) -> impl Iterator<Item = ColorHandle> + '_ {
        let generation = self.generation;
        (0..self.styles.len()).map(move |index| ColorHandle { generation, index })
    }

    /// Release every style. Consumes the arena so it cannot happen twice.
    #[must_use]
    pub fn dispose(self) -> Disposed {
        Disposed {
            generation: self.generation,
            count: self.styles.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
