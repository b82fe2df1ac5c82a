//! The rendering collaborator.
//!
//! Widgets only ever hand finished text to a [`Surface`]; how it reaches a
//! screen is the host's business.

pub trait Surface {
    /// Make the widget visible.
    fn reveal(&mut self);

    /// Replace the widget's content.
    fn render(&mut self, text: &str);
}

/// A surface that records what it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySurface {
    pub visible: bool,
    pub frames: Vec<String>,
}

impl MemorySurface {
    pub fn last(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }
}

impl Surface for MemorySurface {
    fn reveal(&mut self) {
        self.visible = true;
    }

    fn render(&mut self, text: &str) {
        self.frames.push(text.to_string());
    }
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn reveal(&mut self) {
        (**self).reveal();
    }

    fn render(&mut self, text: &str) {
        (**self).render(text);
    }
}
