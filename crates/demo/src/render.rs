use std::fmt::Display;

/// Renders like a dev-tools console: strings quoted, unset slots as `undefined`.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for String {
    fn render(&self) -> String {
        format!("{self:?}")
    }
}

impl Render for usize {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl<T: Render> Render for Option<T> {
    fn render(&self) -> String {
        match self {
            Some(value) => value.render(),
            None => "undefined".to_owned(),
        }
    }
}

impl<A: Render, B: Render> Render for (A, B) {
    fn render(&self) -> String {
        format!("[ {}, {} ]", self.0.render(), self.1.render())
    }
}

impl<T: Render> Render for [T] {
    fn render(&self) -> String {
        if self.is_empty() {
            return "[]".to_owned();
        }
        let parts: Vec<String> = self.iter().map(Render::render).collect();
        format!("[ {} ]", parts.join(", "))
    }
}

impl<T: Render> Render for Vec<T> {
    fn render(&self) -> String {
        self.as_slice().render()
    }
}

pub fn command(line: impl Display) -> String {
    format!("> {line}")
}

pub fn log_line(index: usize, value: &impl Render) -> String {
    format!("{index} : {}", value.render())
}
